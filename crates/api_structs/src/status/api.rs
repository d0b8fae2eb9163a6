use serde::{Deserialize, Serialize};

pub mod get_service_health {
    use super::*;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub message: String,
        /// Number of reminder deliveries that may run at the same time
        pub worker_concurrency: usize,
    }
}
