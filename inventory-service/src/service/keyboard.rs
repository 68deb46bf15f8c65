//! 键盘数据访问服务

use std::collections::HashMap;

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use common::errors::{AppError, AppResult};
use common::models::{Brand, Keyboard, KeyboardInstance, KeyboardItem};

use super::DeleteOutcome;

/// 键盘数据服务
pub struct KeyboardService {
    keyboards: Collection<Keyboard>,
    brands: Collection<Brand>,
    instances: Collection<KeyboardInstance>,
}

impl KeyboardService {
    /// 创建新的键盘服务实例
    pub fn new(db: &Database) -> Self {
        Self {
            keyboards: db.collection(Keyboard::COLLECTION),
            brands: db.collection(Brand::COLLECTION),
            instances: db.collection(KeyboardInstance::COLLECTION),
        }
    }

    /// 列出全部键盘（不解析品牌）
    pub async fn list(&self) -> AppResult<Vec<Keyboard>> {
        let keyboards = self
            .keyboards
            .find(doc! {})
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(keyboards)
    }

    /// 列出全部键盘并解析品牌显示名，按品牌显示名升序。
    ///
    /// 两次独立查询并发发出，联接与排序在内存中完成。
    pub async fn list_with_brands(&self) -> AppResult<Vec<KeyboardItem>> {
        let (keyboards, brands) = tokio::try_join!(
            async {
                let keyboards: Vec<Keyboard> =
                    self.keyboards.find(doc! {}).await?.try_collect().await?;
                Ok::<_, AppError>(keyboards)
            },
            async {
                let brands: Vec<Brand> = self.brands.find(doc! {}).await?.try_collect().await?;
                Ok::<_, AppError>(brands)
            }
        )?;

        let mut items = resolve_keyboards(keyboards, &brands);
        sort_by_brand_name(&mut items);
        Ok(items)
    }

    /// 列出某品牌下的键盘
    pub async fn list_by_brand(&self, brand: ObjectId) -> AppResult<Vec<Keyboard>> {
        let keyboards = self
            .keyboards
            .find(doc! { "brand": brand })
            .sort(doc! { "name": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(keyboards)
    }

    /// 按 ID 查找键盘（可能不存在）
    pub async fn find(&self, id: ObjectId) -> AppResult<Option<Keyboard>> {
        Ok(self.keyboards.find_one(doc! { "_id": id }).await?)
    }

    /// 按 ID 获取键盘，不存在即 NotFound
    pub async fn get(&self, id: ObjectId) -> AppResult<Keyboard> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Keyboard".into()))
    }

    /// 按 ID 获取键盘并解析其品牌（引用解析需顺序执行）
    pub async fn get_with_brand(&self, id: ObjectId) -> AppResult<(Keyboard, Option<Brand>)> {
        let keyboard = self.get(id).await?;
        let brand = self
            .brands
            .find_one(doc! { "_id": keyboard.brand })
            .await?;
        Ok((keyboard, brand))
    }

    /// 创建键盘（无唯一性检查，总是插入）
    pub async fn create(&self, keyboard: Keyboard) -> AppResult<Keyboard> {
        self.keyboards.insert_one(&keyboard).await?;
        tracing::info!(id = %keyboard.id, name = %keyboard.name, "键盘已创建");
        Ok(keyboard)
    }

    /// 更新键盘（整体替换，保留标识）
    pub async fn update(&self, keyboard: Keyboard) -> AppResult<Keyboard> {
        let result = self
            .keyboards
            .replace_one(doc! { "_id": keyboard.id }, &keyboard)
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound("Keyboard".into()));
        }
        tracing::info!(id = %keyboard.id, "键盘已更新");
        Ok(keyboard)
    }

    /// 删除键盘（存在引用它的实例时拒绝）
    pub async fn delete(&self, id: ObjectId) -> AppResult<DeleteOutcome<KeyboardInstance>> {
        let dependents: Vec<KeyboardInstance> = self
            .instances
            .find(doc! { "keyboard": id })
            .await?
            .try_collect()
            .await?;
        if !dependents.is_empty() {
            tracing::info!(id = %id, count = dependents.len(), "键盘仍被实例引用，删除被拒绝");
            return Ok(DeleteOutcome::Blocked(dependents));
        }
        self.keyboards.delete_one(doc! { "_id": id }).await?;
        tracing::info!(id = %id, "键盘已删除");
        Ok(DeleteOutcome::Deleted)
    }

    /// 键盘总数
    pub async fn count(&self) -> AppResult<u64> {
        Ok(self.keyboards.count_documents(doc! {}).await?)
    }
}

/// 将键盘与品牌在内存中联接为条目
pub fn resolve_keyboards(keyboards: Vec<Keyboard>, brands: &[Brand]) -> Vec<KeyboardItem> {
    let by_id: HashMap<ObjectId, &Brand> = brands.iter().map(|b| (b.id, b)).collect();
    keyboards
        .into_iter()
        .map(|keyboard| {
            let brand_name = by_id
                .get(&keyboard.brand)
                .map(|b| b.display_name.clone());
            KeyboardItem::new(keyboard, brand_name)
        })
        .collect()
}

/// 按品牌显示名升序排序，同品牌内按型号名
pub fn sort_by_brand_name(items: &mut [KeyboardItem]) {
    items.sort_by(|a, b| {
        a.brand_name
            .as_deref()
            .unwrap_or_default()
            .cmp(b.brand_name.as_deref().unwrap_or_default())
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(name: &str) -> Brand {
        Brand {
            id: ObjectId::new(),
            name: name.to_lowercase(),
            display_name: name.into(),
            origin: None,
            description: None,
        }
    }

    fn keyboard(name: &str, brand: ObjectId) -> Keyboard {
        Keyboard {
            id: ObjectId::new(),
            name: name.into(),
            brand,
            description: None,
            price: 100,
            image: None,
            image_content_type: None,
        }
    }

    #[test]
    fn test_resolve_keyboards_fills_brand_names() {
        let ducky = brand("Ducky");
        let keyboards = vec![keyboard("One 2", ducky.id), keyboard("Orphan", ObjectId::new())];
        let items = resolve_keyboards(keyboards, &[ducky]);
        assert_eq!(items[0].brand_name.as_deref(), Some("Ducky"));
        assert_eq!(items[1].brand_name, None);
    }

    #[test]
    fn test_sort_by_brand_name() {
        let vortex = brand("Vortex");
        let hhkb = brand("HHKB");
        let keyboards = vec![
            keyboard("Race 3", vortex.id),
            keyboard("Hybrid Type-S", hhkb.id),
            keyboard("Classic", hhkb.id),
        ];
        let mut items = resolve_keyboards(keyboards, &[vortex, hhkb]);
        sort_by_brand_name(&mut items);
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Classic", "Hybrid Type-S", "Race 3"]);
    }
}
