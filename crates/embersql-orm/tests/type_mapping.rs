//! Host-type mapping through a real database: booleans travel as integer
//! 0/1, 32-bit floats promote on bind and truncate on read, byte sequences
//! stay byte-exact, and fallback kinds travel as text.

mod common;

use std::sync::Arc;

use embersql_core::{
    ddl, extract, EntityDef, FieldDef, ScalarKind, SqlValue, TableDescriptor, ToSqlValue,
};
use embersql_orm::{Dao, Entity};
use embersql_sqlite::{read_column, DriverError, SqlDriver, SqlStatement};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, PartialEq)]
struct Metric {
    id: i64,
    enabled: bool,
    ratio: f32,
    payload: Vec<u8>,
    label: String,
}

static METRIC_TABLE: Lazy<TableDescriptor> = Lazy::new(|| {
    extract(
        &EntityDef::new("Metric")
            .table_name("t_metric")
            .field(FieldDef::new("id", ScalarKind::BigInt).primary_key(true))
            .field(FieldDef::new("enabled", ScalarKind::Bool).not_null())
            .field(FieldDef::new("ratio", ScalarKind::Float).not_null())
            .field(FieldDef::new("payload", ScalarKind::Bytes).not_null())
            // A kind outside the canonical set: stored through its text
            // representation.
            .field(FieldDef::new("label", ScalarKind::Other).not_null()),
    )
    .expect("metric entity extracts")
});

impl Entity for Metric {
    fn descriptor() -> &'static TableDescriptor {
        &METRIC_TABLE
    }

    fn to_values(&self) -> Vec<SqlValue> {
        vec![
            self.id.to_sql_value(),
            self.enabled.to_sql_value(),
            self.ratio.to_sql_value(),
            self.payload.clone().to_sql_value(),
            self.label.clone().to_sql_value(),
        ]
    }

    fn from_row(stmt: &dyn SqlStatement) -> Result<Self, DriverError> {
        Ok(Self {
            id: stmt.column_long(0)?,
            enabled: stmt.column_long(1)? == 1,
            ratio: stmt.column_double(2)? as f32,
            payload: stmt.column_blob(3)?,
            label: stmt.column_string(4)?,
        })
    }
}

fn metric_dao() -> (Arc<embersql_sqlite::SqliteDriver>, Dao<Metric>) {
    let driver = common::memory_driver();
    let dynamic: Arc<dyn SqlDriver> = driver.clone();
    let dao = Dao::new(dynamic);
    dao.init_table().unwrap();
    (driver, dao)
}

#[test]
fn test_ddl_reflects_inferred_storage_classes() {
    let sql = ddl::create_table_sql(Metric::descriptor());
    assert_eq!(
        sql,
        "CREATE TABLE IF NOT EXISTS t_metric (\
         id INTEGER PRIMARY KEY AUTOINCREMENT, \
         enabled INTEGER NOT NULL, \
         ratio REAL NOT NULL, \
         payload BLOB NOT NULL, \
         label TEXT NOT NULL)"
    );
}

#[test]
fn test_scalar_kinds_roundtrip() {
    let (_driver, dao) = metric_dao();
    let metric = Metric {
        id: 0,
        enabled: true,
        ratio: 1.25,
        payload: vec![0, 1, 254, 255],
        label: String::from("p99"),
    };
    let id = dao.insert(&metric).unwrap();
    let loaded = dao.select_by_id(id).unwrap().unwrap();
    assert_eq!(
        loaded,
        Metric {
            id,
            ..metric
        }
    );
}

#[test]
fn test_boolean_is_stored_as_integer_zero_or_one() {
    let (driver, dao) = metric_dao();
    let mut metric = Metric {
        id: 0,
        enabled: true,
        ratio: 0.0,
        payload: Vec::new(),
        label: String::from("a"),
    };
    dao.insert(&metric).unwrap();
    metric.enabled = false;
    metric.label = String::from("b");
    dao.insert(&metric).unwrap();

    let mut stmt = driver
        .prepare("SELECT enabled FROM t_metric ORDER BY id")
        .unwrap();
    assert!(stmt.step().unwrap());
    assert_eq!(stmt.column_long(0).unwrap(), 1);
    assert!(stmt.step().unwrap());
    assert_eq!(stmt.column_long(0).unwrap(), 0);
}

#[test]
fn test_read_column_dispatch() {
    let (driver, dao) = metric_dao();
    dao.insert(&Metric {
        id: 0,
        enabled: true,
        ratio: 2.5,
        payload: vec![9],
        label: String::from("x"),
    })
    .unwrap();

    let mut stmt = driver
        .prepare("SELECT enabled, ratio, payload, label FROM t_metric")
        .unwrap();
    assert!(stmt.step().unwrap());
    assert_eq!(
        read_column(stmt.as_ref(), 0, ScalarKind::Bool).unwrap(),
        SqlValue::Integer(1)
    );
    assert_eq!(
        read_column(stmt.as_ref(), 1, ScalarKind::Float).unwrap(),
        SqlValue::Real(2.5)
    );
    assert_eq!(
        read_column(stmt.as_ref(), 2, ScalarKind::Bytes).unwrap(),
        SqlValue::Blob(vec![9])
    );
    assert_eq!(
        read_column(stmt.as_ref(), 3, ScalarKind::Other).unwrap(),
        SqlValue::Text(String::from("x"))
    );
}
