//! 轴体数据访问服务

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use common::errors::{AppError, AppResult};
use common::models::{KeyboardInstance, KeyboardSwitch};
use common::utils::canonical;

use super::DeleteOutcome;

/// 轴体数据服务
pub struct SwitchService {
    switches: Collection<KeyboardSwitch>,
    instances: Collection<KeyboardInstance>,
}

impl SwitchService {
    /// 创建新的轴体服务实例
    pub fn new(db: &Database) -> Self {
        Self {
            switches: db.collection(KeyboardSwitch::COLLECTION),
            instances: db.collection(KeyboardInstance::COLLECTION),
        }
    }

    /// 按规范名升序列出全部轴体
    pub async fn list(&self) -> AppResult<Vec<KeyboardSwitch>> {
        let switches = self
            .switches
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(switches)
    }

    /// 按 ID 查找轴体（可能不存在）
    pub async fn find(&self, id: ObjectId) -> AppResult<Option<KeyboardSwitch>> {
        Ok(self.switches.find_one(doc! { "_id": id }).await?)
    }

    /// 按 ID 获取轴体，不存在即 NotFound
    pub async fn get(&self, id: ObjectId) -> AppResult<KeyboardSwitch> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Switch".into()))
    }

    /// 大小写归一化后按规范名查找
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<KeyboardSwitch>> {
        let found = self
            .switches
            .find_one(doc! { "name": canonical(name) })
            .await?;
        Ok(found)
    }

    /// 创建轴体（同名时返回现有记录，不插入）
    pub async fn create(&self, switch: KeyboardSwitch) -> AppResult<KeyboardSwitch> {
        if let Some(existing) = self.find_by_name(&switch.name).await? {
            tracing::info!(id = %existing.id, name = %existing.name, "轴体已存在，跳过插入");
            return Ok(existing);
        }
        self.switches.insert_one(&switch).await?;
        tracing::info!(id = %switch.id, name = %switch.name, "轴体已创建");
        Ok(switch)
    }

    /// 更新轴体（整体替换，保留标识）
    pub async fn update(&self, switch: KeyboardSwitch) -> AppResult<KeyboardSwitch> {
        let result = self
            .switches
            .replace_one(doc! { "_id": switch.id }, &switch)
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound("Switch".into()));
        }
        tracing::info!(id = %switch.id, "轴体已更新");
        Ok(switch)
    }

    /// 删除轴体（存在引用它的实例时拒绝）
    pub async fn delete(&self, id: ObjectId) -> AppResult<DeleteOutcome<KeyboardInstance>> {
        let dependents: Vec<KeyboardInstance> = self
            .instances
            .find(doc! { "keyboard_switch": id })
            .await?
            .try_collect()
            .await?;
        if !dependents.is_empty() {
            tracing::info!(id = %id, count = dependents.len(), "轴体仍被实例引用，删除被拒绝");
            return Ok(DeleteOutcome::Blocked(dependents));
        }
        self.switches.delete_one(doc! { "_id": id }).await?;
        tracing::info!(id = %id, "轴体已删除");
        Ok(DeleteOutcome::Deleted)
    }

    /// 轴体总数
    pub async fn count(&self) -> AppResult<u64> {
        Ok(self.switches.count_documents(doc! {}).await?)
    }
}
