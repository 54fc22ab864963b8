//! Shared test fixture: a `User` entity mirroring a realistic mapped type,
//! with renamed columns, defaults, a unique single-column index, a
//! composite index and an ignored field.
#![allow(dead_code)]

use std::sync::Arc;

use embersql_core::{
    extract, Column, ColumnType, CompositeIndexDef, EntityDef, FieldDef, ScalarKind, SqlValue,
    TableDescriptor, ToSqlValue,
};
use embersql_orm::{Dao, Entity};
use embersql_sqlite::{DriverError, SqlDriver, SqlStatement, SqliteDriver};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub phone: String,
    pub name: String,
    pub age: i32,
    pub email: Option<String>,
    pub create_time: i64,
    // Not mapped: excluded from DDL, binds and row parsing.
    pub avatar: Option<Vec<u8>>,
}

static USER_TABLE: Lazy<TableDescriptor> = Lazy::new(|| {
    extract(
        &EntityDef::new("User")
            .table_name("t_user")
            .composite_index(CompositeIndexDef::new("idx_name_age", ["t_name", "t_age"]))
            .field(
                FieldDef::new("id", ScalarKind::BigInt)
                    .primary_key(true)
                    .column_name("t_id")
                    .not_null(),
            )
            .field(
                FieldDef::new("phone", ScalarKind::Text)
                    .column_name("t_phone")
                    .not_null()
                    .indexed(true),
            )
            .field(
                FieldDef::new("name", ScalarKind::Text)
                    .column_name("t_name")
                    .not_null()
                    .default_value("''"),
            )
            .field(
                FieldDef::new("age", ScalarKind::Int)
                    .column_name("t_age")
                    .not_null()
                    .default_value("0"),
            )
            .field(FieldDef::new("email", ScalarKind::Text).column_name("t_email"))
            .field(
                FieldDef::new("create_time", ScalarKind::BigInt)
                    .column_name("t_create_time")
                    .not_null()
                    .default_value("CURRENT_TIMESTAMP"),
            )
            .field(FieldDef::new("avatar", ScalarKind::Bytes).ignored()),
    )
    .expect("user entity extracts")
});

impl Entity for User {
    fn descriptor() -> &'static TableDescriptor {
        &USER_TABLE
    }

    fn to_values(&self) -> Vec<SqlValue> {
        vec![
            self.id.to_sql_value(),
            self.phone.clone().to_sql_value(),
            self.name.clone().to_sql_value(),
            self.age.to_sql_value(),
            self.email.clone().to_sql_value(),
            self.create_time.to_sql_value(),
        ]
    }

    fn from_row(stmt: &dyn SqlStatement) -> Result<Self, DriverError> {
        Ok(Self {
            id: stmt.column_long(0)?,
            phone: stmt.column_string(1)?,
            name: stmt.column_string(2)?,
            age: stmt.column_long(3)? as i32,
            email: if stmt.column_type(4)? == ColumnType::Null {
                None
            } else {
                Some(stmt.column_string(4)?)
            },
            create_time: stmt.column_long(5)?,
            avatar: None,
        })
    }
}

/// Typed column handles for the query DSL.
pub struct UserTable;

impl UserTable {
    pub const ID: Column<i64> = Column::new("t_id");
    pub const PHONE: Column<String> = Column::new("t_phone");
    pub const NAME: Column<String> = Column::new("t_name");
    pub const AGE: Column<i32> = Column::new("t_age");
}

pub fn user(phone: &str, name: &str, age: i32) -> User {
    User {
        id: 0,
        phone: String::from(phone),
        name: String::from(name),
        age,
        email: None,
        create_time: 1,
        avatar: None,
    }
}

/// Routes driver/DAO tracing into the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn memory_driver() -> Arc<SqliteDriver> {
    init_tracing();
    Arc::new(SqliteDriver::open_in_memory().expect("in-memory database opens"))
}

pub fn user_dao(driver: &Arc<SqliteDriver>) -> Dao<User> {
    let dynamic: Arc<dyn SqlDriver> = driver.clone();
    let dao = Dao::new(dynamic);
    dao.init_table().expect("table creation succeeds");
    dao
}
