//! 品牌数据访问服务

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use common::errors::{AppError, AppResult};
use common::models::{Brand, Keyboard};
use common::utils::canonical;

use super::DeleteOutcome;

/// 品牌服务 Trait
#[async_trait]
pub trait BrandServiceTrait: Send + Sync {
    /// 按规范名升序列出全部品牌
    async fn list(&self) -> AppResult<Vec<Brand>>;

    /// 按 ID 查找品牌（可能不存在）
    async fn find(&self, id: ObjectId) -> AppResult<Option<Brand>>;

    /// 按 ID 获取品牌，不存在即 NotFound
    async fn get(&self, id: ObjectId) -> AppResult<Brand>;

    /// 创建品牌（同名时返回现有记录，不插入）
    async fn create(&self, brand: Brand) -> AppResult<Brand>;

    /// 更新品牌（整体替换，保留标识）
    async fn update(&self, brand: Brand) -> AppResult<Brand>;

    /// 删除品牌（存在依赖键盘时拒绝）
    async fn delete(&self, id: ObjectId) -> AppResult<DeleteOutcome<Keyboard>>;

    /// 品牌总数
    async fn count(&self) -> AppResult<u64>;
}

/// 品牌数据服务
pub struct BrandService {
    brands: Collection<Brand>,
    keyboards: Collection<Keyboard>,
}

impl BrandService {
    /// 创建新的品牌服务实例
    pub fn new(db: &Database) -> Self {
        Self {
            brands: db.collection(Brand::COLLECTION),
            keyboards: db.collection(Keyboard::COLLECTION),
        }
    }

    /// 大小写归一化后按规范名查找
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Brand>> {
        let found = self
            .brands
            .find_one(doc! { "name": canonical(name) })
            .await?;
        Ok(found)
    }
}

#[async_trait]
impl BrandServiceTrait for BrandService {
    async fn list(&self) -> AppResult<Vec<Brand>> {
        let brands = self
            .brands
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(brands)
    }

    async fn find(&self, id: ObjectId) -> AppResult<Option<Brand>> {
        Ok(self.brands.find_one(doc! { "_id": id }).await?)
    }

    async fn get(&self, id: ObjectId) -> AppResult<Brand> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Brand".into()))
    }

    async fn create(&self, brand: Brand) -> AppResult<Brand> {
        // 规范名唯一：命中现有记录时不插入，调用方重定向过去
        if let Some(existing) = self.find_by_name(&brand.name).await? {
            tracing::info!(id = %existing.id, name = %existing.name, "品牌已存在，跳过插入");
            return Ok(existing);
        }
        self.brands.insert_one(&brand).await?;
        tracing::info!(id = %brand.id, name = %brand.name, "品牌已创建");
        Ok(brand)
    }

    async fn update(&self, brand: Brand) -> AppResult<Brand> {
        let result = self
            .brands
            .replace_one(doc! { "_id": brand.id }, &brand)
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound("Brand".into()));
        }
        tracing::info!(id = %brand.id, "品牌已更新");
        Ok(brand)
    }

    async fn delete(&self, id: ObjectId) -> AppResult<DeleteOutcome<Keyboard>> {
        let dependents: Vec<Keyboard> = self
            .keyboards
            .find(doc! { "brand": id })
            .await?
            .try_collect()
            .await?;
        if !dependents.is_empty() {
            tracing::info!(id = %id, count = dependents.len(), "品牌仍被键盘引用，删除被拒绝");
            return Ok(DeleteOutcome::Blocked(dependents));
        }
        self.brands.delete_one(doc! { "_id": id }).await?;
        tracing::info!(id = %id, "品牌已删除");
        Ok(DeleteOutcome::Deleted)
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.brands.count_documents(doc! {}).await?)
    }
}
