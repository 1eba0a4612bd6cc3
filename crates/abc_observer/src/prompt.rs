use abc_core::config::SimulationParameters;
use abc_core::stats::MetricsSnapshot;
use abc_data::Persona;

pub const PROMPT_VERSION: &str = "v3.0";

/// Prompt sent to a persona's completion client.
#[must_use]
pub fn build_prompt(
    persona: &Persona,
    params: &SimulationParameters,
    metrics: &MetricsSnapshot,
) -> String {
    format!(
        "{} [EQUILIBRIUM MODE {PROMPT_VERSION}]: Analyze stability at scale {}. \
         RadioPi: {}. Coherence: {:.4}. Phase: {}. Rigidity: {:.3}.",
        persona.name, metrics.scale_label, params.radio_pi, metrics.coherence, metrics.phase,
        metrics.rigidity,
    )
}

/// Reads back the coherence value embedded by [`build_prompt`].
#[must_use]
pub fn coherence_from_prompt(prompt: &str) -> Option<f64> {
    let rest = prompt.split("Coherence: ").nth(1)?;
    let value: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    value.trim_end_matches('.').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use abc_core::world::World;

    #[test]
    fn test_prompt_carries_persona_and_metrics() {
        let params = SimulationParameters {
            n_abc: 2.0,
            radio_pi: 1.5,
            seed: Some(1),
            ..SimulationParameters::default()
        };
        let world = World::new(params.clone());
        let persona = Persona::by_id(4).unwrap();
        let prompt = build_prompt(&persona, &params, &world.metrics());

        assert!(prompt.starts_with("IA4 [EQUILIBRIUM MODE v3.0]"));
        assert!(prompt.contains("scale Planck"));
        assert!(prompt.contains("RadioPi: 1.5"));
        assert_eq!(coherence_from_prompt(&prompt), Some(0.0));
    }

    #[test]
    fn test_coherence_missing() {
        assert_eq!(coherence_from_prompt("nothing here"), None);
    }
}
