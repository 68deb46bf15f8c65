//! 演示数据填充工具
//!
//! 用法: `seed [mongodb-uri]`（缺省读取 MONGODB_URI）。
//! 先写品牌与轴体，再写键盘，最后写实例；各阶段刚创建的记录保存在
//! 局部向量中，在步骤之间显式传递。

use anyhow::{Context, Result};
use mongodb::bson::oid::ObjectId;
use mongodb::{Client, Database};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use common::config::AppConfig;
use common::models::{Brand, InstanceStatus, Keyboard, KeyboardInstance, KeyboardSwitch};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut config = AppConfig::load_with_service("seed");
    if let Some(uri) = std::env::args().nth(1) {
        config.mongodb_uri = uri;
    }

    let client = Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("连接 MongoDB 失败")?;
    let db = client.database(&config.database);

    let brands = seed_brands(&db).await?;
    let switches = seed_switches(&db).await?;
    let keyboards = seed_keyboards(&db, &brands).await?;
    let instances = seed_instances(&db, &keyboards, &switches).await?;

    tracing::info!(
        brands = brands.len(),
        switches = switches.len(),
        keyboards = keyboards.len(),
        instances = instances.len(),
        "演示数据填充完成"
    );
    Ok(())
}

fn brand(name: &str, display_name: &str, origin: Option<&str>) -> Brand {
    Brand {
        id: ObjectId::new(),
        name: name.to_string(),
        display_name: display_name.to_string(),
        origin: origin.map(String::from),
        description: None,
    }
}

async fn seed_brands(db: &Database) -> Result<Vec<Brand>> {
    let brands = vec![
        brand("ducky", "Ducky", Some("United States")),
        brand("hhkb", "HHKB", None),
        brand("leopold", "Leopold", Some("Korea")),
        brand("vortex", "Vortex", Some("Taiwan")),
    ];
    db.collection::<Brand>(Brand::COLLECTION)
        .insert_many(&brands)
        .await
        .context("写入品牌失败")?;
    for b in &brands {
        tracing::info!(name = %b.name, "品牌已写入");
    }
    Ok(brands)
}

fn switch(name: &str, display_name: &str, description: Option<&str>) -> KeyboardSwitch {
    KeyboardSwitch {
        id: ObjectId::new(),
        name: name.to_string(),
        display_name: display_name.to_string(),
        description: description.map(String::from),
    }
}

async fn seed_switches(db: &Database) -> Result<Vec<KeyboardSwitch>> {
    let switches = vec![
        switch(
            "topre",
            "Topre",
            Some(
                "Electro-capacitive switches with the feel of a rubber dome plus \
                 the tactile feedback of a mechanical keyboard.",
            ),
        ),
        switch(
            "cherry mx red",
            "Cherry MX Red",
            Some(
                "Linear switching characteristic with low spring resistance; \
                 a first choice for newcomers to mechanical keyboards.",
            ),
        ),
        switch("cherry mx blue", "Cherry MX Blue", None),
    ];
    db.collection::<KeyboardSwitch>(KeyboardSwitch::COLLECTION)
        .insert_many(&switches)
        .await
        .context("写入轴体失败")?;
    for s in &switches {
        tracing::info!(name = %s.name, "轴体已写入");
    }
    Ok(switches)
}

fn keyboard(name: &str, brand: &Brand, description: Option<&str>, price: i64) -> Keyboard {
    Keyboard {
        id: ObjectId::new(),
        name: name.to_string(),
        brand: brand.id,
        description: description.map(String::from),
        price,
        image: None,
        image_content_type: None,
    }
}

async fn seed_keyboards(db: &Database, brands: &[Brand]) -> Result<Vec<Keyboard>> {
    let keyboards = vec![
        keyboard(
            "One 2",
            &brands[0],
            Some(
                "PBT double shot seamless keycaps with side laser engraving. \
                 Smaller size, but no functions sacrificed.",
            ),
            130,
        ),
        keyboard(
            "Classic",
            &brands[1],
            Some(
                "Designed by programmers for programmers; hands never need \
                 to leave the home row.",
            ),
            145,
        ),
        keyboard("FC750R", &brands[2], None, 153),
        keyboard(
            "Race 3",
            &brands[3],
            Some(
                "A 75% keyboard with dedicated arrow keys and nearly no \
                 learning curve.",
            ),
            110,
        ),
        keyboard(
            "Hybrid Type-S",
            &brands[1],
            Some(
                "Full key map customization plus 6 DIP switches and three \
                 adjustable keyboard heights.",
            ),
            137,
        ),
        keyboard("Test Keyboard 1", &brands[1], None, 99),
    ];
    db.collection::<Keyboard>(Keyboard::COLLECTION)
        .insert_many(&keyboards)
        .await
        .context("写入键盘失败")?;
    for k in &keyboards {
        tracing::info!(name = %k.name, price = k.price, "键盘已写入");
    }
    Ok(keyboards)
}

fn instance(
    keyboard: &Keyboard,
    status: InstanceStatus,
    switch: &KeyboardSwitch,
) -> KeyboardInstance {
    KeyboardInstance {
        id: ObjectId::new(),
        keyboard: keyboard.id,
        status,
        keyboard_switch: switch.id,
        date_sold: None,
    }
}

async fn seed_instances(
    db: &Database,
    keyboards: &[Keyboard],
    switches: &[KeyboardSwitch],
) -> Result<Vec<KeyboardInstance>> {
    use InstanceStatus::{InStock, Returned, Sold};

    let instances = vec![
        instance(&keyboards[0], InStock, &switches[2]),
        instance(&keyboards[1], InStock, &switches[0]),
        instance(&keyboards[3], Sold, &switches[0]),
        instance(&keyboards[4], InStock, &switches[1]),
        instance(&keyboards[5], InStock, &switches[0]),
        instance(&keyboards[0], InStock, &switches[2]),
        instance(&keyboards[2], InStock, &switches[1]),
        instance(&keyboards[4], InStock, &switches[0]),
        instance(&keyboards[5], Returned, &switches[2]),
        instance(&keyboards[4], Sold, &switches[0]),
        instance(&keyboards[0], Sold, &switches[2]),
    ];
    db.collection::<KeyboardInstance>(KeyboardInstance::COLLECTION)
        .insert_many(&instances)
        .await
        .context("写入键盘实例失败")?;
    for i in &instances {
        tracing::info!(id = %i.id, status = %i.status, "实例已写入");
    }
    Ok(instances)
}
