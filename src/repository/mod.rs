// ==========================================
// 模切机生产记录系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供本地键值存储访问接口，屏蔽存储细节
// 约束: 所有查询使用参数化，防止 SQL 注入
// ==========================================

pub mod error;
pub mod kv_store;
pub mod production_repo;
pub mod sqlite_store;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use kv_store::{KeyValueStore, MemoryStore};
pub use production_repo::{ProductionRepository, COUNTER_KEY, RECORDS_KEY, SETTINGS_KEY};
pub use sqlite_store::SqliteKvStore;
