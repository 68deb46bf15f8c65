//! 键盘实例数据访问服务

use std::collections::HashMap;

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::{Collection, Database};

use common::errors::{AppError, AppResult};
use common::models::{
    Brand, InstanceStatus, Keyboard, KeyboardInstance, KeyboardInstanceItem, KeyboardSwitch,
};

/// 键盘实例数据服务。实例是叶子实体，删除无需守卫。
pub struct InstanceService {
    instances: Collection<KeyboardInstance>,
    keyboards: Collection<Keyboard>,
    brands: Collection<Brand>,
    switches: Collection<KeyboardSwitch>,
}

impl InstanceService {
    /// 创建新的实例服务实例
    pub fn new(db: &Database) -> Self {
        Self {
            instances: db.collection(KeyboardInstance::COLLECTION),
            keyboards: db.collection(Keyboard::COLLECTION),
            brands: db.collection(Brand::COLLECTION),
            switches: db.collection(KeyboardSwitch::COLLECTION),
        }
    }

    async fn fetch_instances(&self, filter: Document) -> AppResult<Vec<KeyboardInstance>> {
        let instances = self.instances.find(filter).await?.try_collect().await?;
        Ok(instances)
    }

    /// 列出全部实例并解析键盘、品牌（经键盘二跳）与轴体，
    /// 按状态升序、品牌名升序排序。
    pub async fn list_resolved(&self) -> AppResult<Vec<KeyboardInstanceItem>> {
        let (instances, keyboards, brands, switches) = tokio::try_join!(
            self.fetch_instances(doc! {}),
            async {
                let keyboards: Vec<Keyboard> =
                    self.keyboards.find(doc! {}).await?.try_collect().await?;
                Ok::<_, AppError>(keyboards)
            },
            async {
                let brands: Vec<Brand> = self.brands.find(doc! {}).await?.try_collect().await?;
                Ok::<_, AppError>(brands)
            },
            async {
                let switches: Vec<KeyboardSwitch> =
                    self.switches.find(doc! {}).await?.try_collect().await?;
                Ok::<_, AppError>(switches)
            }
        )?;

        let mut items = resolve_instances(instances, &keyboards, &brands, &switches);
        sort_instances(&mut items);
        Ok(items)
    }

    /// 列出某键盘下的实例并解析轴体名
    pub async fn list_by_keyboard_resolved(
        &self,
        keyboard: ObjectId,
    ) -> AppResult<Vec<KeyboardInstanceItem>> {
        let (instances, switches) = tokio::try_join!(
            self.fetch_instances(doc! { "keyboard": keyboard }),
            async {
                let switches: Vec<KeyboardSwitch> =
                    self.switches.find(doc! {}).await?.try_collect().await?;
                Ok::<_, AppError>(switches)
            }
        )?;
        Ok(resolve_instances(instances, &[], &[], &switches))
    }

    /// 列出某轴体下的实例并解析键盘名
    pub async fn list_by_switch_resolved(
        &self,
        switch: ObjectId,
    ) -> AppResult<Vec<KeyboardInstanceItem>> {
        let (instances, keyboards) = tokio::try_join!(
            self.fetch_instances(doc! { "keyboard_switch": switch }),
            async {
                let keyboards: Vec<Keyboard> =
                    self.keyboards.find(doc! {}).await?.try_collect().await?;
                Ok::<_, AppError>(keyboards)
            }
        )?;
        Ok(resolve_instances(instances, &keyboards, &[], &[]))
    }

    /// 按 ID 查找实例（可能不存在）
    pub async fn find(&self, id: ObjectId) -> AppResult<Option<KeyboardInstance>> {
        Ok(self.instances.find_one(doc! { "_id": id }).await?)
    }

    /// 按 ID 获取实例，不存在即 NotFound
    pub async fn get(&self, id: ObjectId) -> AppResult<KeyboardInstance> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Keyboard instance".into()))
    }

    /// 按 ID 获取实例并逐跳解析键盘、品牌与轴体
    pub async fn get_resolved(&self, id: ObjectId) -> AppResult<KeyboardInstanceItem> {
        let instance = self.get(id).await?;

        // 键盘与轴体互相独立，并发解析；品牌依赖键盘，随后解析
        let (keyboard, switch) = tokio::try_join!(
            async {
                Ok::<_, AppError>(
                    self.keyboards
                        .find_one(doc! { "_id": instance.keyboard })
                        .await?,
                )
            },
            async {
                Ok::<_, AppError>(
                    self.switches
                        .find_one(doc! { "_id": instance.keyboard_switch })
                        .await?,
                )
            }
        )?;

        let brand = match &keyboard {
            Some(kb) => self.brands.find_one(doc! { "_id": kb.brand }).await?,
            None => None,
        };

        Ok(KeyboardInstanceItem::new(
            instance,
            keyboard.map(|k| k.name),
            brand.map(|b| b.display_name),
            switch.map(|s| s.display_name),
        ))
    }

    /// 创建实例（总是插入）
    pub async fn create(&self, instance: KeyboardInstance) -> AppResult<KeyboardInstance> {
        self.instances.insert_one(&instance).await?;
        tracing::info!(id = %instance.id, status = %instance.status, "实例已创建");
        Ok(instance)
    }

    /// 更新实例（整体替换，保留标识）
    pub async fn update(&self, instance: KeyboardInstance) -> AppResult<KeyboardInstance> {
        let result = self
            .instances
            .replace_one(doc! { "_id": instance.id }, &instance)
            .await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound("Keyboard instance".into()));
        }
        tracing::info!(id = %instance.id, status = %instance.status, "实例已更新");
        Ok(instance)
    }

    /// 删除实例（叶子实体，总是放行）
    pub async fn delete(&self, id: ObjectId) -> AppResult<()> {
        self.instances.delete_one(doc! { "_id": id }).await?;
        tracing::info!(id = %id, "实例已删除");
        Ok(())
    }

    /// 实例总数
    pub async fn count(&self) -> AppResult<u64> {
        Ok(self.instances.count_documents(doc! {}).await?)
    }

    /// 在库实例数
    pub async fn count_in_stock(&self) -> AppResult<u64> {
        let filter = doc! { "status": InstanceStatus::InStock.label() };
        Ok(self.instances.count_documents(filter).await?)
    }
}

/// 将实例与键盘、品牌（二跳）、轴体在内存中联接为条目
pub fn resolve_instances(
    instances: Vec<KeyboardInstance>,
    keyboards: &[Keyboard],
    brands: &[Brand],
    switches: &[KeyboardSwitch],
) -> Vec<KeyboardInstanceItem> {
    let keyboards_by_id: HashMap<ObjectId, &Keyboard> =
        keyboards.iter().map(|k| (k.id, k)).collect();
    let brands_by_id: HashMap<ObjectId, &Brand> = brands.iter().map(|b| (b.id, b)).collect();
    let switches_by_id: HashMap<ObjectId, &KeyboardSwitch> =
        switches.iter().map(|s| (s.id, s)).collect();

    instances
        .into_iter()
        .map(|instance| {
            let keyboard = keyboards_by_id.get(&instance.keyboard);
            let brand_name = keyboard
                .and_then(|k| brands_by_id.get(&k.brand))
                .map(|b| b.display_name.clone());
            let switch_name = switches_by_id
                .get(&instance.keyboard_switch)
                .map(|s| s.display_name.clone());
            let keyboard_name = keyboard.map(|k| k.name.clone());
            KeyboardInstanceItem::new(instance, keyboard_name, brand_name, switch_name)
        })
        .collect()
}

/// 按状态升序、品牌名升序排序
pub fn sort_instances(items: &mut [KeyboardInstanceItem]) {
    items.sort_by(|a, b| {
        a.status.cmp(&b.status).then_with(|| {
            a.brand_name
                .as_deref()
                .unwrap_or_default()
                .cmp(b.brand_name.as_deref().unwrap_or_default())
        })
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

    fn switch(name: &str) -> KeyboardSwitch {
        KeyboardSwitch {
            id: ObjectId::new(),
            name: name.to_lowercase(),
            display_name: name.into(),
            description: None,
        }
    }

    fn instance(
        keyboard: ObjectId,
        status: InstanceStatus,
        keyboard_switch: ObjectId,
    ) -> KeyboardInstance {
        KeyboardInstance {
            id: ObjectId::new(),
            keyboard,
            status,
            keyboard_switch,
            date_sold: None,
        }
    }

    #[test]
    fn test_resolve_instances_two_hop_brand() {
        let ducky = brand("Ducky");
        let one2 = keyboard("One 2", ducky.id);
        let topre = switch("Topre");
        let items = resolve_instances(
            vec![instance(one2.id, InstanceStatus::InStock, topre.id)],
            &[one2],
            &[ducky],
            &[topre],
        );
        assert_eq!(items[0].keyboard_name.as_deref(), Some("One 2"));
        assert_eq!(items[0].brand_name.as_deref(), Some("Ducky"));
        assert_eq!(items[0].switch_name.as_deref(), Some("Topre"));
    }

    #[test]
    fn test_resolve_instances_tolerates_dangling_refs() {
        let topre = switch("Topre");
        let items = resolve_instances(
            vec![instance(ObjectId::new(), InstanceStatus::Sold, topre.id)],
            &[],
            &[],
            &[topre],
        );
        assert_eq!(items[0].keyboard_name, None);
        assert_eq!(items[0].brand_name, None);
        assert_eq!(items[0].switch_name.as_deref(), Some("Topre"));
    }

    #[test]
    fn test_sort_instances_status_then_brand() {
        let hhkb = brand("HHKB");
        let vortex = brand("Vortex");
        let classic = keyboard("Classic", hhkb.id);
        let race3 = keyboard("Race 3", vortex.id);
        let topre = switch("Topre");

        let mut items = resolve_instances(
            vec![
                instance(race3.id, InstanceStatus::Sold, topre.id),
                instance(race3.id, InstanceStatus::InStock, topre.id),
                instance(classic.id, InstanceStatus::InStock, topre.id),
            ],
            &[classic, race3],
            &[hhkb, vortex],
            &[topre],
        );
        sort_instances(&mut items);

        let order: Vec<_> = items
            .iter()
            .map(|i| (i.status.as_str(), i.brand_name.as_deref().unwrap()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("In-stock", "HHKB"),
                ("In-stock", "Vortex"),
                ("Sold", "Vortex"),
            ]
        );
    }
}
