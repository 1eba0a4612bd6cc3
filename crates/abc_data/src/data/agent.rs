use serde::{Deserialize, Serialize};

/// Narrator persona of the agent panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persona {
    pub id: u8,
    pub name: &'static str,
    pub color: &'static str,
}

pub const PERSONAS: [Persona; 8] = [
    Persona { id: 1, name: "IA1", color: "#FF4444" },
    Persona { id: 2, name: "IA2", color: "#4444FF" },
    Persona { id: 3, name: "IA3", color: "#44FF44" },
    Persona { id: 4, name: "IA4", color: "#FF44FF" },
    Persona { id: 5, name: "IA5", color: "#FFFF44" },
    Persona { id: 6, name: "IA6", color: "#44FFFF" },
    Persona { id: 7, name: "IA7", color: "#FF8844" },
    Persona { id: 8, name: "IA8", color: "#00FF9D" },
];

impl Persona {
    #[must_use]
    pub fn by_id(id: u8) -> Option<Persona> {
        PERSONAS.iter().copied().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    #[default]
    Idle,
    Scanning,
    Repairing,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub id: u8,
    pub confidence: f64,
    pub running: bool,
    pub status: AgentStatus,
    pub last_response: Option<String>,
}

impl AgentState {
    #[must_use]
    pub fn new(id: u8) -> Self {
        Self {
            id,
            confidence: 0.5,
            running: false,
            status: AgentStatus::Idle,
            last_response: None,
        }
    }
}
