//! Category resolution: display name, icon and colour for a raw
//! [`CategoryRef`].
//!
//! Numeric references are 1-based positions in a per-context table. The
//! tables differ between contexts (index 1 is "Alimentação" for expenses
//! but "Salário" for income), so the context must always be supplied.
//! Icons and colours come from a keyword table matched against the
//! resolved name, ignoring case and accents.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{CategoryRef, TransactionKind};

/// Icon used when no keyword matches.
pub const FALLBACK_ICON: &str = "help-circle-outline";

/// Colour used when no keyword matches.
pub const FALLBACK_COLOR: &str = "#A239FF";

/// Default expense categories.
pub const EXPENSE_CATEGORIES: [&str; 9] = [
    "Alimentação",
    "Transporte",
    "Moradia",
    "Saúde",
    "Educação",
    "Lazer",
    "Supermercado",
    "Vestuário",
    "Outras",
];

/// Default income categories.
pub const INCOME_CATEGORIES: [&str; 6] = [
    "Salário",
    "Freelance",
    "Investimentos",
    "Vendas",
    "Presentes",
    "Outras",
];

/// Default salary categories.
pub const SALARY_CATEGORIES: [&str; 6] = [
    "Mensal",
    "Quinzenal",
    "Semanal",
    "Bônus",
    "Participação",
    "Outras",
];

/// Table used where the screen does not know the transaction kind.
pub const GENERIC_CATEGORIES: [&str; 12] = [
    "Alimentação",
    "Transporte",
    "Moradia",
    "Saúde",
    "Educação",
    "Lazer",
    "Vestuário",
    "Tecnologia",
    "Investimentos",
    "Salário",
    "Freelance",
    "Outros",
];

/// Keyword table: (accent-free lowercase fragments, icon, colour).
/// Order matters; the first entry with a matching fragment wins.
const KEYWORD_STYLES: [(&[&str], &str, &str); 26] = [
    (&["supermercado", "mercado"], "basket-outline", "#8BC34A"),
    (&["aliment", "comida", "restaurante", "lanche"], "fast-food-outline", "#FF9800"),
    (&["transporte", "carro", "combustivel", "uber", "onibus"], "car-outline", "#4CAF50"),
    (&["moradia", "casa", "aluguel"], "home-outline", "#03A9F4"),
    (&["saude", "medico", "farmacia"], "medkit-outline", "#F44336"),
    (&["educacao", "estudo", "curso", "escola"], "school-outline", "#9C27B0"),
    (&["lazer"], "game-controller-outline", "#3F51B5"),
    (&["entreten", "cinema", "streaming"], "film-outline", "#673AB7"),
    (&["compras", "shopping"], "bag-handle-outline", "#E91E63"),
    (&["viagem", "turismo"], "airplane-outline", "#00BCD4"),
    (&["tecnologia", "eletronico"], "laptop-outline", "#607D8B"),
    (&["vestuario", "roupa"], "shirt-outline", "#FF4081"),
    (&["servico"], "construct-outline", "#795548"),
    (&["utilidade", "energia", "internet", "agua"], "flash-outline", "#FFC107"),
    (&["assinatura"], "repeat-outline", "#9E9E9E"),
    (&["pet", "animal"], "paw-outline", "#FF5722"),
    (&["salario"], "cash-outline", "#4CAF50"),
    (&["freelance"], "briefcase-outline", "#009688"),
    (&["investimento", "dividendo"], "trending-up-outline", "#2196F3"),
    (&["venda"], "cash-outline", "#8BC34A"),
    (&["presente"], "gift-outline", "#E91E63"),
    (&["quinzenal"], "calendar-number-outline", "#03A9F4"),
    (&["semanal"], "today-outline", "#00BCD4"),
    (&["mensal"], "calendar-outline", "#4CAF50"),
    (&["bonus"], "star-outline", "#FFC107"),
    (&["participacao"], "people-outline", "#9C27B0"),
];

/// Which default table numeric references index into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryContext {
    /// Expense screens.
    Expense,
    /// Income screens.
    Income,
    /// Salary screens.
    Salary,
    /// Screens that mix kinds (reports fallbacks, generic lists).
    Generic,
}

impl CategoryContext {
    /// All contexts.
    pub const ALL: [Self; 4] = [Self::Expense, Self::Income, Self::Salary, Self::Generic];

    /// Stable key used to persist the context's category list.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "despesa",
            Self::Income => "ganho",
            Self::Salary => "salario",
            Self::Generic => "geral",
        }
    }

    /// Built-in category names for this context.
    #[inline]
    #[must_use]
    pub const fn defaults(self) -> &'static [&'static str] {
        match self {
            Self::Expense => &EXPENSE_CATEGORIES,
            Self::Income => &INCOME_CATEGORIES,
            Self::Salary => &SALARY_CATEGORIES,
            Self::Generic => &GENERIC_CATEGORIES,
        }
    }
}

impl From<TransactionKind> for CategoryContext {
    #[inline]
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Expense => Self::Expense,
            TransactionKind::Income => Self::Income,
            TransactionKind::Salary => Self::Salary,
        }
    }
}

impl fmt::Display for CategoryContext {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved presentation of a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CategoryStyle {
    /// Name shown to the user.
    pub display_name: String,
    /// Icon identifier (Ionicons naming).
    pub icon: &'static str,
    /// Hex colour.
    pub color: &'static str,
}

/// Resolves a category against the built-in tables.
///
/// Never fails: unknown indices become `Categoria {id}` and unknown names
/// get the fallback icon and colour.
#[must_use]
pub fn resolve_category(context: CategoryContext, category: &CategoryRef) -> CategoryStyle {
    style_for(display_name(context.defaults(), category))
}

/// Picks the icon and colour for a category name.
#[must_use]
pub fn icon_and_color(name: &str) -> (&'static str, &'static str) {
    let folded = fold(name);
    KEYWORD_STYLES
        .iter()
        .find(|&&(keywords, _, _)| keywords.iter().any(|keyword| folded.contains(keyword)))
        .map_or((FALLBACK_ICON, FALLBACK_COLOR), |&(_, icon, color)| (icon, color))
}

/// Builds the style for an already resolved name.
fn style_for(display_name: String) -> CategoryStyle {
    let (icon, color) = icon_and_color(&display_name);
    CategoryStyle {
        display_name,
        icon,
        color,
    }
}

/// Maps a reference to its display name using `table`.
fn display_name<S: AsRef<str>>(table: &[S], category: &CategoryRef) -> String {
    category.index().map_or_else(
        || category.to_string(),
        |index| {
            usize::try_from(index)
                .ok()
                .and_then(|position| position.checked_sub(1))
                .and_then(|position| table.get(position))
                .map_or_else(|| format!("Categoria {index}"), |name| AsRef::<str>::as_ref(name).to_owned())
        },
    )
}

/// Returns `true` when two category names differ only in case, accents or
/// surrounding whitespace.
pub(crate) fn same_name(left: &str, right: &str) -> bool {
    fold(left.trim()) == fold(right.trim())
}

/// Lowercases and strips Portuguese diacritics.
fn fold(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|ch| match ch {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Error returned when adding a category that already exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("category {name:?} already exists in {context}")]
pub struct DuplicateCategory {
    /// Context the category was added to.
    pub context: CategoryContext,
    /// The rejected name.
    pub name: String,
}

/// Per-context category lists, starting from the built-in defaults and
/// extended by the user.
///
/// New names are appended, so existing numeric indices keep their meaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTables {
    /// Expense list.
    expense: Vec<String>,
    /// Income list.
    income: Vec<String>,
    /// Salary list.
    salary: Vec<String>,
    /// Generic list.
    generic: Vec<String>,
}

impl Default for CategoryTables {
    #[inline]
    fn default() -> Self {
        Self {
            expense: owned(&EXPENSE_CATEGORIES),
            income: owned(&INCOME_CATEGORIES),
            salary: owned(&SALARY_CATEGORIES),
            generic: owned(&GENERIC_CATEGORIES),
        }
    }
}

impl CategoryTables {
    /// Returns the list for `context`.
    #[inline]
    #[must_use]
    pub fn names(&self, context: CategoryContext) -> &[String] {
        match context {
            CategoryContext::Expense => &self.expense,
            CategoryContext::Income => &self.income,
            CategoryContext::Salary => &self.salary,
            CategoryContext::Generic => &self.generic,
        }
    }

    /// Replaces the list for `context` (e.g. with one loaded from storage).
    ///
    /// An empty list restores the defaults.
    pub fn set_names(&mut self, context: CategoryContext, names: Vec<String>) {
        *self.names_mut(context) = if names.is_empty() {
            owned(context.defaults())
        } else {
            names
        };
    }

    /// Appends a category to `context`.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateCategory`] if a category with the same name
    /// (ignoring case and accents) is already present.
    pub fn add(&mut self, context: CategoryContext, name: &str) -> Result<(), DuplicateCategory> {
        let trimmed = name.trim();
        let list = self.names_mut(context);
        if list.iter().any(|existing| same_name(existing, trimmed)) {
            return Err(DuplicateCategory {
                context,
                name: trimmed.to_owned(),
            });
        }
        list.push(trimmed.to_owned());
        tracing::debug!(%context, name = trimmed, "category added");
        Ok(())
    }

    /// Resolves a category against this context's current list.
    #[must_use]
    pub fn resolve(&self, context: CategoryContext, category: &CategoryRef) -> CategoryStyle {
        style_for(display_name(self.names(context), category))
    }

    /// Mutable access to the list for `context`.
    const fn names_mut(&mut self, context: CategoryContext) -> &mut Vec<String> {
        match context {
            CategoryContext::Expense => &mut self.expense,
            CategoryContext::Income => &mut self.income,
            CategoryContext::Salary => &mut self.salary,
            CategoryContext::Generic => &mut self.generic,
        }
    }
}

/// Copies a static table into owned strings.
fn owned(table: &[&str]) -> Vec<String> {
    table.iter().map(|&name| name.to_owned()).collect()
}
