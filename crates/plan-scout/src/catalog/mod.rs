//! Plan, TDU, and tax records plus the loaders that hydrate them from the
//! fetched data files. The records are read-only inputs to the engine; the
//! ingestion pipeline that produces the files is a separate system.

pub mod archive;
pub mod domain;
pub mod store;

pub use domain::{
    CityTaxData, ElectricityPlan, EtfDetails, EtfSource, EtfStructure, LocalTaxesData,
    PlansData, PlansMetadata, RangeTaxData, RateType, TaxInfo, TaxSource, TduRate, TduRatesData,
};
pub use store::{CatalogError, PlanCatalog};
