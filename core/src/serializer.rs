//! Reusable serializer: a [`Schema`] plus the [`Field`] and extra-clean hook
//! registered for each declared name.
//!
//! ```
//! use sheetclean::{Field, NoHooks, RunStatus, Schema, Serializer, Worksheet};
//!
//! let serializer = Serializer::builder(Schema::new(1, ["name", "quantity"]).unwrap())
//!     .field("name", Field::text("Name", 20))
//!     .field("quantity", Field::integer("Quantity"))
//!     .build()
//!     .unwrap();
//!
//! let sheet = Worksheet::from_rows(vec![vec!["Name", "Quantity"], vec!["Bolts", "12"]]);
//! let report = serializer.run(&sheet, &mut NoHooks).unwrap();
//! assert_eq!(report.status, RunStatus::Imported);
//! assert_eq!(report.cleaned_data.len(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ConfigError, ConfigResult, RunResult, ValidationError};
use crate::fields::Field;
use crate::grid::Grid;
use crate::models::Value;
use crate::pipeline::{CellContext, ExtraClean, Hooks, Passthrough, RowPipeline, RunReport, TransactionScope};
use crate::schema::Schema;

/// One declared column.
#[derive(Clone)]
pub(crate) struct Column {
    pub(crate) name: String,
    pub(crate) field: Field,
    pub(crate) extra_clean: Option<Arc<ExtraClean>>,
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("field", &self.field)
            .field("extra_clean", &self.extra_clean.is_some())
            .finish()
    }
}

/// Validated serializer definition. Never mutated by a run.
#[derive(Debug, Clone)]
pub struct Serializer {
    schema: Schema,
    columns: Vec<Column>,
}

impl Serializer {
    pub fn builder(schema: Schema) -> SerializerBuilder {
        SerializerBuilder {
            schema,
            fields: HashMap::new(),
            extra_cleans: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Field registered for `name`.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| &column.field)
    }

    /// Declared `(name, field)` pairs in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.columns
            .iter()
            .map(|column| (column.name.as_str(), &column.field))
    }

    /// Pipeline over `grid` with its own copy of the fields.
    pub fn pipeline<'g, G: Grid + ?Sized>(&self, grid: &'g G) -> RowPipeline<'g, G> {
        RowPipeline::new(grid, self.schema.clone(), self.columns.clone())
    }

    /// Validate and import `grid` without a transaction backend.
    pub fn run<G, H>(&self, grid: &G, hooks: &mut H) -> RunResult<RunReport>
    where
        G: Grid + ?Sized,
        H: Hooks + ?Sized,
    {
        self.run_in(grid, hooks, &mut Passthrough)
    }

    /// Validate and import `grid`, importing inside `scope` when the schema
    /// enables transactions.
    pub fn run_in<G, H, T>(&self, grid: &G, hooks: &mut H, scope: &mut T) -> RunResult<RunReport>
    where
        G: Grid + ?Sized,
        H: Hooks + ?Sized,
        T: TransactionScope + ?Sized,
    {
        self.pipeline(grid).run(hooks, scope)
    }
}

/// Collects fields and hooks; everything is checked in [`SerializerBuilder::build`].
pub struct SerializerBuilder {
    schema: Schema,
    fields: HashMap<String, Field>,
    extra_cleans: HashMap<String, Arc<ExtraClean>>,
}

impl SerializerBuilder {
    /// Register the field for a declared name. A later call for the same
    /// name replaces the earlier one.
    pub fn field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Register a post-validation hook for a declared name.
    pub fn extra_clean<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&Value, &CellContext<'_>) -> Result<Option<Value>, ValidationError>
            + Send
            + Sync
            + 'static,
    {
        let hook: Arc<ExtraClean> = Arc::new(hook);
        self.extra_cleans.insert(name.into(), hook);
        self
    }

    pub fn build(self) -> ConfigResult<Serializer> {
        let declared = self.schema.fields();

        if let Some(name) = self
            .extra_cleans
            .keys()
            .find(|name| !declared.contains(*name))
        {
            return Err(ConfigError::HookForUnknownField(name.clone()));
        }

        let mut columns = Vec::with_capacity(declared.len());
        for name in declared {
            let field = self
                .fields
                .get(name)
                .ok_or_else(|| ConfigError::FieldNotExist(name.clone()))?;
            field.check()?;
            columns.push(Column {
                name: name.clone(),
                field: field.clone(),
                extra_clean: self.extra_cleans.get(name).cloned(),
            });
        }

        Ok(Serializer {
            schema: self.schema,
            columns,
        })
    }
}
