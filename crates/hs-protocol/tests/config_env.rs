//! Environment override for the election timeout. Kept in its own test
//! binary so the variable never leaks into other tests.

use std::time::Duration;

use hs_protocol::config::TIMEOUT_ENV;
use hs_protocol::RingConfig;

#[test]
fn timeout_env_var_overrides_default() {
    std::env::set_var(TIMEOUT_ENV, "1500");
    assert_eq!(
        RingConfig::new().election_timeout(),
        Duration::from_millis(1500)
    );

    // The builder still wins over the environment.
    assert_eq!(
        RingConfig::new()
            .timeout(Duration::from_secs(2))
            .election_timeout(),
        Duration::from_secs(2)
    );

    std::env::set_var(TIMEOUT_ENV, "not-a-number");
    assert_eq!(
        RingConfig::new().election_timeout(),
        Duration::from_secs(30)
    );
    std::env::remove_var(TIMEOUT_ENV);
}
