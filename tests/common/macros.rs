/// Asserts the number of quarks, atoms and molecules in the world.
#[macro_export]
macro_rules! assert_structures {
    ($world:expr, quarks: $q:expr, atoms: $a:expr, molecules: $m:expr) => {
        assert_eq!($world.quarks().len(), $q, "quark count mismatch");
        assert_eq!($world.atoms().len(), $a, "atom count mismatch");
        assert_eq!($world.molecules().len(), $m, "molecule count mismatch");
    };
}

/// Asserts that every float in a metrics snapshot is finite.
#[macro_export]
macro_rules! assert_metrics_finite {
    ($metrics:expr) => {
        let m = &$metrics;
        assert!(m.all_finite(), "non-finite metrics: {:?}", m);
    };
}

/// Counts events matching a pattern.
#[macro_export]
macro_rules! count_events {
    ($events:expr, $pattern:pat) => {
        $events.iter().filter(|e| matches!(e, $pattern)).count()
    };
}
