//! End-to-end tests of the process-wide dispatcher
//!
//! The global slots are shared by every test in this binary, so everything
//! that touches them lives in one sequential test. Value checks through the
//! global entry points are in `global_values.rs`.

use fastdot::prelude::*;
use fastdot::{active_tier, best_tier, init_from_env, CpuFeatures, POLICY_ENV_VAR};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn global_selection_lifecycle() {
    init_logging();
    let best = best_tier(&CpuFeatures::detect());

    // First use of each family installs the automatic choice.
    assert_eq!(dot_single(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
    assert_eq!(dot_double(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
    assert_eq!(dot_mixed(&[1.0, 2.0], &[3.0, 4.0]), 11.0);
    for family in Family::ALL {
        assert_eq!(active_tier(family), Some(best));
    }

    // Explicit selection switches all three families together.
    assert_eq!(select(Policy::Scalar), Tier::Scalar);
    for family in Family::ALL {
        assert_eq!(active_tier(family), Some(Tier::Scalar));
    }

    // Idempotent, and never stronger than what the machine supports.
    for tier in Tier::ALL {
        let first = select(Policy::from(tier));
        assert_eq!(select(Policy::from(tier)), first);
        assert!(first <= tier);
        assert!(first <= best);
    }

    // Unknown policy codes behave like Auto.
    assert_eq!(select(Policy::from_code(42)), best);
    assert_eq!(select(Policy::Auto), best);

    // Environment configuration.
    std::env::set_var(POLICY_ENV_VAR, "scalar");
    assert_eq!(init_from_env(), Tier::Scalar);
    std::env::set_var(POLICY_ENV_VAR, "not-a-tier");
    assert_eq!(init_from_env(), best);
    std::env::remove_var(POLICY_ENV_VAR);
    assert_eq!(init_from_env(), best);
}

#[test]
fn private_dispatcher_is_independent() {
    let dispatcher = Dispatcher::new();
    dispatcher.select(Policy::Scalar);
    assert_eq!(dispatcher.active(Family::Single), Some(Tier::Scalar));
    assert_eq!(dispatcher.dot_single(&[2.0, 2.0], &[0.5, 0.25]), 1.5);
}
