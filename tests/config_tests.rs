use std::env;

use payroll::config::{Config, EmployerCostPolicy};
use pretty_assertions::assert_eq;
use serial_test::serial;

const KEYS: &[&str] = &[
    "DATABASE_URL",
    "JWT_SECRET",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "CORS_ORIGIN",
    "EXPECTED_DAILY_HOURS",
    "ABSENCE_JOB_INTERVAL_SECS",
    "EMPLOYER_COST_POLICY",
];

/// Clears the config variables and restores them when dropped.
struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvGuard {
    fn clear() -> Self {
        let saved = KEYS.iter().map(|key| (*key, env::var(key).ok())).collect();
        for key in KEYS {
            unsafe {
                env::remove_var(key);
            }
        }
        EnvGuard { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            unsafe {
                match value {
                    Some(value) => env::set_var(key, value),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

#[test]
#[serial]
fn test_config_from_env_with_defaults() {
    let _guard = EnvGuard::clear();

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://@localhost:5432/payroll");
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert_eq!(config.cors_origin, "http://localhost:3000");
    assert_eq!(config.expected_daily_hours, 8.0);
    assert_eq!(config.absence_job_interval_secs, 86_400);
    assert_eq!(config.employer_cost_policy, EmployerCostPolicy::BasicWage);
    assert!(config.absence_job_enabled());
    assert!(config.is_development());
}

#[test]
#[serial]
fn test_config_from_env_with_custom_values() {
    let _guard = EnvGuard::clear();
    unsafe {
        env::set_var("DATABASE_URL", "postgres://payroll@db:5432/payroll");
        env::set_var("JWT_SECRET", "test-secret");
        env::set_var("HOST", "0.0.0.0");
        env::set_var("PORT", "3000");
        env::set_var("ENVIRONMENT", "production");
        env::set_var("EXPECTED_DAILY_HOURS", "7.5");
        env::set_var("ABSENCE_JOB_INTERVAL_SECS", "0");
        env::set_var("EMPLOYER_COST_POLICY", "gross_plus_employer_pf");
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://payroll@db:5432/payroll");
    assert_eq!(config.jwt_secret, "test-secret");
    assert_eq!(config.server_address(), "0.0.0.0:3000");
    assert!(config.is_production());
    assert_eq!(config.expected_daily_hours, 7.5);
    assert!(!config.absence_job_enabled());
    assert_eq!(
        config.employer_cost_policy,
        EmployerCostPolicy::GrossPlusEmployerPf
    );
}

#[test]
#[serial]
fn test_config_rejects_unknown_cost_policy() {
    let _guard = EnvGuard::clear();
    unsafe {
        env::set_var("EMPLOYER_COST_POLICY", "everything");
    }

    assert!(Config::from_env_only().is_err());
}

#[test]
#[serial]
fn test_invalid_port_falls_back_to_default() {
    let _guard = EnvGuard::clear();
    unsafe {
        env::set_var("PORT", "not-a-port");
    }

    let config = Config::from_env_only().unwrap();
    assert_eq!(config.port, 8080);
}

#[test]
fn test_test_config_is_deterministic() {
    let config = Config::test_config();

    assert_eq!(config.environment, "test");
    assert_eq!(config.port, 0);
    assert!(!config.absence_job_enabled());
}
