//! # skill-persistence
//!
//! 持久属性层的协作方实现：
//! - [`PartitionKeyGenerator`]：决定一次事件的属性归属于哪个用户、设备或说话人；
//! - [`InMemoryPersistenceAdapter`]：进程内实现，适合本地运行与测试。
//!
//! 外部存储的适配器只需实现 [`skill_core::PersistenceAdapter`]，并复用这里的分区键策略。

mod key;
mod memory;

pub use key::PartitionKeyGenerator;
pub use memory::InMemoryPersistenceAdapter;
