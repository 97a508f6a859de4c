//! The reflection field: one configured field tying compilation, output,
//! export, filtering, sorting and grouping together.

use reflectfield_core::{CompileSession, CompiledRecord, EntryId, ExportMode, FieldId, ReflectFieldConfig};
use reflectfield_xml::OutputElement;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{FieldError, FieldResult};
use crate::expression::ExpressionCompiler;
use crate::filter::{FilterCompiler, FilterOutcome, JoinCounter};
use crate::format::{FormatterSelection, ValueFormatter};
use crate::group::{FieldRecord, RecordGroups, group_records};
use crate::sort::SortClause;
use crate::source::{DocumentRequest, DocumentSource};
use crate::storage::StorageWriter;

/// Per-field settings.
///
/// # Examples
///
/// ```
/// use reflectfield_core::FieldId;
/// use reflectfield_engine::FieldSettings;
///
/// let settings = FieldSettings::builder()
///     .field_id(FieldId::new(7).unwrap())
///     .element_name("summary")
///     .expression("{entry/title} by {entry/author}")
///     .build();
/// assert!(settings.xslt.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct FieldSettings {
    /// Identity of the field.
    pub field_id: FieldId,
    /// Element name used for output and grouping.
    #[builder(setter(into))]
    pub element_name: String,
    /// Expression template with `{...}` placeholders.
    #[builder(setter(into))]
    pub expression: String,
    /// Formatter applied to the substituted value.
    #[builder(default)]
    #[serde(default)]
    pub formatter: FormatterSelection,
    /// XSLT utility forwarded to the document source.
    #[builder(default, setter(strip_option, into))]
    #[serde(default)]
    pub xslt: Option<String>,
    /// Whether the document source should include associated entry counts.
    #[builder(default)]
    #[serde(default)]
    pub fetch_associated_counts: bool,
}

/// Features a reflection field supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Entries can be grouped by the field's handle.
    OutputGrouping,
    /// The field can be output as a page parameter.
    ParameterOutput,
    /// Entries can be filtered by the field.
    Filtering,
    /// Filters can be pre-populated from stored values.
    Prepopulation,
    /// Entries can be sorted by the field.
    Sorting,
}

impl Capability {
    /// Every capability.
    pub const ALL: [Self; 5] = [
        Self::OutputGrouping,
        Self::ParameterOutput,
        Self::Filtering,
        Self::Prepopulation,
        Self::Sorting,
    ];
}

/// A configured reflection field.
#[derive(Debug, Clone)]
pub struct ReflectionField {
    settings: FieldSettings,
    compiler: ExpressionCompiler,
    filters: FilterCompiler,
}

impl ReflectionField {
    /// Create a field from its settings.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::Core` if `config` is invalid.
    pub fn new(settings: FieldSettings, formatter: ValueFormatter, config: &ReflectFieldConfig) -> FieldResult<Self> {
        config.validate()?;
        let filters = FilterCompiler::new(settings.field_id);
        Ok(Self {
            settings,
            compiler: ExpressionCompiler::new(formatter, config.handle_max_length),
            filters,
        })
    }

    /// The field's settings.
    #[must_use]
    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    /// The field's id.
    #[must_use]
    pub fn id(&self) -> FieldId {
        self.settings.field_id
    }

    // ---------------------------------------------------------------------------
    // Compilation
    // ---------------------------------------------------------------------------

    /// Compile the field for `entry_id` and store the result.
    ///
    /// The field is marked as compiling in `session` until this returns, on
    /// every path.
    ///
    /// # Errors
    ///
    /// Returns `FieldError::DocumentLoad` if the source fails,
    /// `FieldError::Storage` if the writer fails, or a formatter error.
    pub fn compile(
        &self,
        session: &CompileSession,
        entry_id: EntryId,
        source: &dyn DocumentSource,
        writer: &dyn StorageWriter,
    ) -> FieldResult<CompiledRecord> {
        let _guard = session.enter(self.id());

        let request = DocumentRequest {
            session,
            entry_id,
            element_name: &self.settings.element_name,
            xslt: self.settings.xslt.as_deref(),
            fetch_associated_counts: self.settings.fetch_associated_counts,
        };
        let document = source
            .load(&request)
            .map_err(|source| FieldError::DocumentLoad { entry: entry_id, source })?;

        let record = self
            .compiler
            .compile(&self.settings.expression, document.as_ref(), &self.settings.formatter)?;

        writer
            .write(self.id(), entry_id, &record)
            .map_err(|source| FieldError::Storage { entry: entry_id, source })?;

        tracing::debug!(field = %self.id(), entry = %entry_id, handle = ?record.handle, "compiled field");
        Ok(record)
    }

    // ---------------------------------------------------------------------------
    // Output
    // ---------------------------------------------------------------------------

    /// The output element for stored `data`.
    ///
    /// Returns `None` while this field is compiling in `session`, so a field
    /// never embeds itself, and when there is no formatted value.
    #[must_use]
    pub fn append_formatted_element(&self, session: &CompileSession, data: &CompiledRecord) -> Option<OutputElement> {
        if session.is_compiling(self.id()) {
            tracing::debug!(field = %self.id(), "skipping output while compiling");
            return None;
        }
        if data.value_formatted.is_empty() {
            return None;
        }
        Some(OutputElement {
            name: self.settings.element_name.clone(),
            handle: data.handle.clone(),
            value: data.value_formatted.clone(),
        })
    }

    /// The value exported for `mode`.
    #[must_use]
    pub fn prepare_export_value<'a>(&self, data: &'a CompiledRecord, mode: ExportMode) -> &'a str {
        match mode {
            ExportMode::Value => &data.value,
            ExportMode::Formatted => &data.value_formatted,
        }
    }

    /// Names of the supported export modes.
    #[must_use]
    pub fn export_modes() -> [&'static str; 2] {
        ExportMode::ALL.map(ExportMode::name)
    }

    // ---------------------------------------------------------------------------
    // Querying
    // ---------------------------------------------------------------------------

    /// Compile filter tokens against this field's data.
    #[must_use]
    pub fn build_filter<T: AsRef<str>>(
        &self,
        tokens: &[T],
        and_operation: bool,
        counter: &mut JoinCounter,
    ) -> FilterOutcome {
        self.filters.compile(tokens, and_operation, counter)
    }

    /// Ordering by this field for a host-supplied order string.
    #[must_use]
    pub fn build_sort(&self, order: &str) -> SortClause {
        SortClause::from_order(self.id(), order)
    }

    /// Group `records` by the handle this field compiled to.
    #[must_use]
    pub fn group_records<'r, R: FieldRecord>(&self, records: &'r [R]) -> Option<RecordGroups<'r, R>> {
        group_records(self.id(), &self.settings.element_name, records)
    }

    /// Supported capabilities.
    #[must_use]
    pub fn capabilities() -> &'static [Capability] {
        &Capability::ALL
    }

    /// Whether `capability` is supported.
    #[must_use]
    pub fn supports(capability: Capability) -> bool {
        Self::capabilities().contains(&capability)
    }
}
