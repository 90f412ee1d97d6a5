use super::Adjustment;

/// Per-comp working set of adjustments.
///
/// Presets are kept with set semantics in selection order; custom entries keep
/// insertion order and are dropped when their amount is zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentSet {
    presets: Vec<String>,
    custom: Vec<(String, i64)>,
}

impl AdjustmentSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.presets.iter().any(|selected| selected == name)
    }

    pub fn select_preset(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.is_selected(&name) {
            self.presets.push(name);
        }
    }

    /// Flips the preset in or out of the set, returning whether it is now selected.
    pub fn toggle_preset(&mut self, name: &str) -> bool {
        if let Some(position) = self.presets.iter().position(|selected| selected == name) {
            self.presets.remove(position);
            false
        } else {
            self.presets.push(name.to_string());
            true
        }
    }

    /// Returns `false` when the entry was dropped as a no-op.
    pub fn add_custom(&mut self, label: impl Into<String>, amount: i64) -> bool {
        let label = label.into();
        if amount == 0 || label.trim().is_empty() {
            return false;
        }
        self.custom.push((label, amount));
        true
    }

    pub fn remove_custom(&mut self, index: usize) -> Option<(String, i64)> {
        (index < self.custom.len()).then(|| self.custom.remove(index))
    }

    pub fn clear(&mut self) {
        self.presets.clear();
        self.custom.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty() && self.custom.is_empty()
    }

    pub fn to_adjustments(&self) -> Vec<Adjustment> {
        self.presets
            .iter()
            .map(|name| Adjustment::preset(name.clone()))
            .chain(
                self.custom
                    .iter()
                    .map(|(label, amount)| Adjustment::custom(label.clone(), *amount)),
            )
            .collect()
    }
}
