use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `face_verifications` 集合中的一条记录
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaceVerification {
    pub user_id: String,
    /// 前端截取的图像（通常是 data URL），服务端不解析
    pub face_image: String,
    #[serde(default)]
    pub steps: Vec<String>,
    pub verified: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FaceVerificationRequest {
    #[schema(example = "data:image/jpeg;base64,...")]
    pub face_image: String,
    #[serde(default)]
    #[schema(example = json!(["look_straight", "turn_left", "turn_right", "blink"]))]
    pub steps: Vec<String>,
}
