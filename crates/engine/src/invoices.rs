//! Sales invoice primitives.
//!
//! Invoices are the primary match target. They are read-only to the engine
//! and loaded fresh per run from a configurable date floor onwards.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Whether an invoice was issued by our own billing or originated from an
/// external system (e.g. marketplace-generated invoices).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceSource {
    Internal,
    External,
}

impl InvoiceSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

impl TryFrom<&str> for InvoiceSource {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "internal" => Ok(Self::Internal),
            "external" => Ok(Self::External),
            other => Err(EngineError::InvalidRecord(format!(
                "invalid invoice source: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Invoice {
    pub id: String,
    /// Invoice number, `RE<year><sequence>`.
    pub number: String,
    pub gross_minor: i64,
    pub issued_on: NaiveDate,
    /// External order reference; may embed an `AU…` order code.
    pub order_reference: Option<String>,
    pub source: InvoiceSource,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub number: String,
    pub gross_minor: i64,
    pub issued_on: Date,
    pub order_reference: Option<String>,
    pub source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Invoice {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            number: model.number,
            gross_minor: model.gross_minor,
            issued_on: model.issued_on,
            order_reference: model.order_reference,
            source: InvoiceSource::try_from(model.source.as_str())?,
        })
    }
}
