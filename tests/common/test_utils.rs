use kling_draw::config::{Config, Deployment, GenerationConfig, LogsConfig, ServiceConfig};

/// Create a test configuration with sensible defaults
pub fn create_test_config() -> Config {
    Config {
        service: ServiceConfig {
            deployment: Deployment::Cn,
            cookie: "did=test-cookie".to_string(),
        },
        generation: GenerationConfig {
            timeout_minutes: 1,
            default_aspect_ratio: "1:1".to_string(),
            default_image_weight: 0.5,
            print_progress: false,
        },
        logs: LogsConfig {
            level: "debug".to_string(),
        },
    }
}

/// Same configuration pointed at the international deployment
pub fn create_global_test_config() -> Config {
    let mut config = create_test_config();
    config.service.deployment = Deployment::Global;
    config
}
