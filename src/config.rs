use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;

/// How a payslip's employer cost is derived from its computed figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmployerCostPolicy {
    /// Prorated basic wage only.
    #[default]
    BasicWage,
    /// Gross wage plus the employer's PF contribution.
    GrossPlusEmployerPf,
}

impl std::str::FromStr for EmployerCostPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "basic_wage" => Ok(EmployerCostPolicy::BasicWage),
            "gross_plus_employer_pf" => Ok(EmployerCostPolicy::GrossPlusEmployerPf),
            other => Err(anyhow!("Invalid EMPLOYER_COST_POLICY: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origin: String,
    pub expected_daily_hours: f64,
    pub absence_job_interval_secs: u64,
    pub employer_cost_policy: EmployerCostPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self::from_env_only()
    }

    /// Load configuration from environment variables only (without loading .env files)
    /// This is useful for testing where you want to control the environment directly
    pub fn from_env_only() -> Result<Self> {
        let employer_cost_policy = match env::var("EMPLOYER_COST_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => EmployerCostPolicy::default(),
        };

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/payroll".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| {
                "your-super-secret-jwt-key-change-this-in-production-12345".to_string()
            }),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            expected_daily_hours: env::var("EXPECTED_DAILY_HOURS")
                .unwrap_or_else(|_| "8".to_string())
                .parse()
                .unwrap_or(8.0),
            absence_job_interval_secs: env::var("ABSENCE_JOB_INTERVAL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86_400),
            employer_cost_policy,
        })
    }

    /// Fixed configuration for tests; never reads the environment.
    pub fn test_config() -> Self {
        Config {
            database_url: "postgres://@localhost:5432/payroll_test".to_string(),
            jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            cors_origin: "http://localhost:3000".to_string(),
            expected_daily_hours: 8.0,
            absence_job_interval_secs: 0,
            employer_cost_policy: EmployerCostPolicy::BasicWage,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn absence_job_enabled(&self) -> bool {
        self.absence_job_interval_secs > 0
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_employer_cost_policy() {
        assert_eq!(
            "basic_wage".parse::<EmployerCostPolicy>().unwrap(),
            EmployerCostPolicy::BasicWage
        );
        assert_eq!(
            " Gross_Plus_Employer_PF ".parse::<EmployerCostPolicy>().unwrap(),
            EmployerCostPolicy::GrossPlusEmployerPf
        );
        assert!("gross".parse::<EmployerCostPolicy>().is_err());
    }

    #[test]
    fn test_config_disables_absence_job() {
        let config = Config::test_config();
        assert!(!config.absence_job_enabled());
        assert_eq!(config.server_address(), "127.0.0.1:0");
    }
}
