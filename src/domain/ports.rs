use crate::domain::model::{MedicineRecord, TransformResult};
use crate::utils::error::{FetchFailure, Result};
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// 給錯誤訊息用的完整路徑
    fn describe(&self, path: &str) -> String;
}

/// 依條目編號取得一筆藥品資料
#[async_trait]
pub trait EntrySource: Send + Sync {
    async fn fetch(&self, entry_id: u64) -> std::result::Result<MedicineRecord, FetchFailure>;
}

/// 兩次請求之間的節流
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn acquire(&self);
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<MedicineRecord>>;
    async fn transform(&self, data: Vec<MedicineRecord>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
