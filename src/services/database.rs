use crate::config::Config;
use crate::error::{AppError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use surrealdb::engine::remote::http::{Client, Http};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{debug, error, info};

/// 启动时执行的表结构与索引定义
///
/// 表本身保持 SCHEMALESS，仅声明需要类型断言的时间字段和
/// 保证唯一性的索引。预订表上的 (spot_id, start_date, end_date)
/// 索引支撑重叠查询。
const SCHEMA: &str = r#"
DEFINE TABLE parking SCHEMALESS;
DEFINE FIELD created_at ON TABLE parking TYPE datetime;
DEFINE FIELD updated_at ON TABLE parking TYPE datetime;

DEFINE TABLE parking_spot SCHEMALESS;
DEFINE INDEX parking_spot_number ON TABLE parking_spot COLUMNS parking_id, number UNIQUE;

DEFINE TABLE reservation SCHEMALESS;
DEFINE FIELD start_date ON TABLE reservation TYPE datetime;
DEFINE FIELD end_date ON TABLE reservation TYPE datetime;
DEFINE FIELD checked_in_at ON TABLE reservation TYPE option<datetime>;
DEFINE FIELD exit_time ON TABLE reservation TYPE option<datetime>;
DEFINE FIELD start_reminder_at ON TABLE reservation TYPE datetime;
DEFINE FIELD end_reminder_at ON TABLE reservation TYPE datetime;
DEFINE FIELD created_at ON TABLE reservation TYPE datetime;
DEFINE FIELD updated_at ON TABLE reservation TYPE datetime;
DEFINE INDEX reservation_spot_window ON TABLE reservation COLUMNS spot_id, start_date, end_date;

DEFINE TABLE vehicle SCHEMALESS;
DEFINE FIELD created_at ON TABLE vehicle TYPE datetime;
DEFINE INDEX vehicle_plate ON TABLE vehicle COLUMNS plate UNIQUE;

DEFINE TABLE notification SCHEMALESS;
DEFINE FIELD created_at ON TABLE notification TYPE datetime;

DEFINE TABLE review SCHEMALESS;
DEFINE FIELD created_at ON TABLE review TYPE datetime;
"#;

/// 数据库服务
#[derive(Clone)]
pub struct Database {
    client: Surreal<Client>,
}

impl Database {
    /// 创建新的数据库实例
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let client = Surreal::new::<Http>(config.database_url.as_str()).await?;

        client
            .signin(Root {
                username: &config.database_username,
                password: &config.database_password,
            })
            .await?;

        client
            .use_ns(&config.database_namespace)
            .use_db(&config.database_name)
            .await?;

        Ok(Self { client })
    }

    /// 验证数据库连接
    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.query("INFO FOR DB").await {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    /// 应用表结构与索引定义，幂等
    pub async fn init_schema(&self) -> Result<()> {
        self.client.query(SCHEMA).await?.check()?;
        info!("Database schema applied");
        Ok(())
    }

    /// 执行原始查询
    pub async fn query(&self, sql: &str) -> Result<Response> {
        let response = self.client.query(sql).await?.check()?;
        Ok(response)
    }

    /// 执行带参数的查询，JSON 对象的每个键绑定为一个参数
    pub async fn query_with_params(&self, sql: &str, params: Value) -> Result<Response> {
        let response = self.client.query(sql).bind(params).await?.check()?;
        Ok(response)
    }

    /// 创建记录并返回归一化后的完整内容
    ///
    /// 记录 ID 由调用方生成（UUID 字符串）。CONTENT 中如携带 id
    /// 字段会先剥除，记录键以 type::thing 指定的为准。
    pub async fn create<T>(&self, table: &str, id: &str, mut data: Value) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if let Value::Object(ref mut map) = data {
            map.remove("id");
        }
        debug!("Creating {} record: {}", table, id);

        let mut response = self
            .client
            .query("CREATE type::thing($tb, $id) CONTENT $data RETURN NONE")
            .query("SELECT *, meta::id(id) AS id FROM type::thing($tb, $id)")
            .bind(("tb", table))
            .bind(("id", id))
            .bind(("data", data))
            .await?
            .check()?;

        let created: Vec<T> = response.take(1)?;
        created
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("Failed to create record"))
    }

    /// 通过ID获取单个记录
    pub async fn get_by_id<T>(&self, table: &str, id: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut response = self
            .client
            .query("SELECT *, meta::id(id) AS id FROM type::thing($tb, $id)")
            .bind(("tb", table))
            .bind(("id", id))
            .await?
            .check()?;

        let rows: Vec<T> = response.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// 获取表内全部记录
    pub async fn select_all<T>(&self, table: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let mut response = self
            .client
            .query("SELECT *, meta::id(id) AS id FROM type::table($tb)")
            .bind(("tb", table))
            .await?
            .check()?;

        let rows: Vec<T> = response.take(0)?;
        Ok(rows)
    }

    /// 通过ID合并更新记录并返回更新后的内容
    pub async fn merge_by_id<T>(&self, table: &str, id: &str, updates: Value) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut response = self
            .client
            .query("UPDATE type::thing($tb, $id) MERGE $updates RETURN NONE")
            .query("SELECT *, meta::id(id) AS id FROM type::thing($tb, $id)")
            .bind(("tb", table))
            .bind(("id", id))
            .bind(("updates", updates))
            .await?
            .check()?;

        let rows: Vec<T> = response.take(1)?;
        Ok(rows.into_iter().next())
    }

    /// 通过ID删除记录，返回记录是否存在
    pub async fn delete_by_id(&self, table: &str, id: &str) -> Result<bool> {
        let mut response = self
            .client
            .query("DELETE type::thing($tb, $id) RETURN BEFORE")
            .bind(("tb", table))
            .bind(("id", id))
            .await?
            .check()?;

        let deleted: Vec<Value> = response.take(0)?;
        Ok(!deleted.is_empty())
    }

    /// 按单字段等值查找首条记录
    pub async fn find_one<T>(&self, table: &str, field: &str, value: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let sql = format!(
            "SELECT *, meta::id(id) AS id FROM type::table($tb) WHERE {} = $value LIMIT 1",
            field
        );
        let mut response = self
            .client
            .query(sql)
            .bind(("tb", table))
            .bind(("value", value))
            .await?
            .check()?;

        let rows: Vec<T> = response.take(0)?;
        Ok(rows.into_iter().next())
    }
}
