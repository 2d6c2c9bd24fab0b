//! Compilation of storage predicates and staged mutations to SQL.
//!
//! Every value is bound as a parameter. Field paths resolve through the
//! entity's column table; a path the table does not know is rejected.

use sqlx::{QueryBuilder, Sqlite};

use roster_core::error::AppError;
use roster_core::result::AppResult;
use roster_core::types::{Condition, FilterOp, FilterValue, Operand};
use roster_entity::{Reference, StoredEntity};

/// `SELECT ... WHERE <condition> ORDER BY <id>` for entity `E`.
pub fn select<E: StoredEntity>(
    condition: &Condition,
) -> AppResult<QueryBuilder<'static, Sqlite>> {
    let mut qb = QueryBuilder::new(E::SELECT);
    qb.push(" WHERE ");
    push_condition::<E>(&mut qb, condition)?;
    qb.push(" ORDER BY ");
    qb.push(E::ORDER_BY);
    Ok(qb)
}

/// Like [`select`], keeping only the first row in id order.
pub fn select_first<E: StoredEntity>(
    condition: &Condition,
) -> AppResult<QueryBuilder<'static, Sqlite>> {
    let mut qb = select::<E>(condition)?;
    qb.push(" LIMIT 1");
    Ok(qb)
}

/// Look up the id of the record a reference points at.
pub fn lookup(reference: &Reference) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT id FROM {} WHERE {} = ",
        reference.table, reference.key_column
    ));
    qb.push_bind(reference.key.clone());
    qb.push(" ORDER BY id LIMIT 1");
    qb
}

/// `INSERT INTO table (...) VALUES (...)`.
pub fn insert(
    table: &str,
    values: &[(&'static str, FilterValue)],
) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO {table} ("));
    {
        let mut columns = qb.separated(", ");
        for (column, _) in values {
            columns.push(*column);
        }
    }
    qb.push(") VALUES (");
    for (i, (_, value)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(")");
    qb
}

/// `UPDATE table SET ... WHERE id = ?`.
pub fn replace(
    table: &str,
    id: i64,
    values: &[(&'static str, FilterValue)],
) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(format!("UPDATE {table} SET "));
    for (i, (column, value)) in values.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(*column);
        qb.push(" = ");
        push_value(&mut qb, value);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb
}

/// `DELETE FROM table WHERE id IN (...)`.
pub fn delete(table: &str, ids: &[i64]) -> QueryBuilder<'static, Sqlite> {
    let mut qb = QueryBuilder::new(format!("DELETE FROM {table} WHERE id IN ("));
    {
        let mut list = qb.separated(", ");
        for id in ids {
            list.push_bind(*id);
        }
    }
    qb.push(")");
    qb
}

fn push_condition<E: StoredEntity>(
    qb: &mut QueryBuilder<'static, Sqlite>,
    condition: &Condition,
) -> AppResult<()> {
    match condition {
        Condition::Constant(true) => {
            qb.push("1 = 1");
        }
        Condition::Constant(false) => {
            qb.push("1 = 0");
        }
        Condition::Not(inner) => {
            // A NULL comparison counts as false before negation.
            qb.push("NOT COALESCE((");
            push_condition::<E>(qb, inner)?;
            qb.push("), 0)");
        }
        Condition::All(items) => push_group::<E>(qb, items, " AND ", "1 = 1")?,
        Condition::Any(items) => push_group::<E>(qb, items, " OR ", "1 = 0")?,
        Condition::Compare { operand, op, value } => push_compare::<E>(qb, operand, *op, value)?,
    }
    Ok(())
}

fn push_group<E: StoredEntity>(
    qb: &mut QueryBuilder<'static, Sqlite>,
    items: &[Condition],
    separator: &str,
    empty: &str,
) -> AppResult<()> {
    if items.is_empty() {
        qb.push(empty);
        return Ok(());
    }
    qb.push("(");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        push_condition::<E>(qb, item)?;
    }
    qb.push(")");
    Ok(())
}

fn push_compare<E: StoredEntity>(
    qb: &mut QueryBuilder<'static, Sqlite>,
    operand: &Operand,
    op: FilterOp,
    value: &FilterValue,
) -> AppResult<()> {
    let expression = operand_sql::<E>(operand)?;

    match (op, value) {
        (FilterOp::IsNull, _) | (FilterOp::Eq, FilterValue::Null) => {
            qb.push(format!("{expression} IS NULL"));
        }
        (FilterOp::IsNotNull, _) | (FilterOp::Ne, FilterValue::Null) => {
            qb.push(format!("{expression} IS NOT NULL"));
        }
        (FilterOp::In, FilterValue::StringList(items)) if items.is_empty() => {
            qb.push("1 = 0");
        }
        (FilterOp::In, FilterValue::IntegerList(items)) if items.is_empty() => {
            qb.push("1 = 0");
        }
        (FilterOp::In, FilterValue::StringList(items)) => {
            qb.push(format!("{expression} IN ("));
            let mut list = qb.separated(", ");
            for item in items {
                list.push_bind(item.clone());
            }
            list.push_unseparated(")");
        }
        (FilterOp::In, FilterValue::IntegerList(items)) => {
            qb.push(format!("{expression} IN ("));
            let mut list = qb.separated(", ");
            for item in items {
                list.push_bind(*item);
            }
            list.push_unseparated(")");
        }
        (FilterOp::In, scalar) => {
            qb.push(format!("{expression} = "));
            push_value(qb, scalar);
        }
        (_, FilterValue::StringList(_) | FilterValue::IntegerList(_)) => {
            return Err(AppError::translation_unsupported(format!(
                "operator {} cannot take a list value",
                op.as_sql()
            )));
        }
        (op, scalar) => {
            qb.push(format!("{expression} {} ", op.as_sql()));
            push_value(qb, scalar);
        }
    }
    Ok(())
}

fn operand_sql<E: StoredEntity>(operand: &Operand) -> AppResult<String> {
    Ok(match operand {
        Operand::Field(path) => E::column(path)
            .ok_or_else(|| {
                AppError::translation_unsupported(format!(
                    "field '{path}' is not stored for {}",
                    E::KIND
                ))
            })?
            .to_string(),
        Operand::Lower(inner) => format!("LOWER({})", operand_sql::<E>(inner)?),
        Operand::Upper(inner) => format!("UPPER({})", operand_sql::<E>(inner)?),
        Operand::Length(inner) => format!("LENGTH({})", operand_sql::<E>(inner)?),
        Operand::Random | Operand::Now => {
            return Err(AppError::translation_unsupported(format!(
                "operand '{operand}' cannot be compiled"
            )));
        }
    })
}

fn push_value(qb: &mut QueryBuilder<'static, Sqlite>, value: &FilterValue) {
    match value {
        FilterValue::String(s) => {
            qb.push_bind(s.clone());
        }
        FilterValue::Integer(i) => {
            qb.push_bind(*i);
        }
        FilterValue::Float(f) => {
            qb.push_bind(*f);
        }
        FilterValue::Boolean(b) => {
            qb.push_bind(*b);
        }
        FilterValue::Null | FilterValue::StringList(_) | FilterValue::IntegerList(_) => {
            qb.push_bind(None::<String>);
        }
    }
}
