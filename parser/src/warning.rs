//! The lenient-mode warning channel (spec.md §6.2, §7).
//!
//! A plain callback injected at parser construction, not a queue or an
//! event bus: the handler runs synchronously, inline with the parse, before
//! parsing continues (spec.md §5). It must not retain references into the
//! partial tree, which is why every field here is owned.

/// One lenient-mode diagnostic, matching spec.md's warning subscription
/// signature field-for-field.
#[derive(Debug, Clone)]
pub struct SegmentWarning {
    pub interchange_control_number: Option<String>,
    pub group_control_number: Option<String>,
    pub transaction_control_number: Option<String>,
    pub segment_index: usize,
    pub segment_id: String,
    pub segment_string: String,
    pub message: String,
    /// Always `false` for warnings raised by this parser: a file that
    /// produced any warning is, by definition, not a clean parse.
    pub file_is_valid: bool,
}
