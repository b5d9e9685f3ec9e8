use serde::Deserialize;
use uuid::Uuid;

// 推文列表过滤条件
#[derive(Debug, Default, Deserialize)]
pub struct TweetsFilter {
    #[serde(rename = "userID")]
    pub user_id: Option<Uuid>,
}
