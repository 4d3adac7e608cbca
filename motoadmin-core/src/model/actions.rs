//! src/model/actions.rs
//! ============================================================================
//! # Actions: Row and Bulk Action Kinds
//!
//! Closed tagged unions for the per-row and bulk verbs, with static lookup
//! tables (label, hotkey, color) indexed by variant instead of open string
//! keys. Eligibility rules live here so the table and the controller agree
//! on exactly which buttons exist for a given row.

use ratatui::style::Color;

use crate::model::row::Row;

/// Per-row verbs rendered in the appended "Acciones" column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    View,
    Edit,
    Delete,
    Activate,
    Deactivate,
    Restore,
    HardDelete,
}

impl RowAction {
    pub const ALL: [RowAction; 7] = [
        RowAction::View,
        RowAction::Edit,
        RowAction::Delete,
        RowAction::Activate,
        RowAction::Deactivate,
        RowAction::Restore,
        RowAction::HardDelete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RowAction::View => "Ver",
            RowAction::Edit => "Editar",
            RowAction::Delete => "Eliminar",
            RowAction::Activate => "Activar",
            RowAction::Deactivate => "Desactivar",
            RowAction::Restore => "Restaurar",
            RowAction::HardDelete => "Eliminar definitivamente",
        }
    }

    /// Hotkey shown in the Acciones cell and mapped by the controller.
    pub fn hotkey(self) -> char {
        match self {
            RowAction::View => 'v',
            RowAction::Edit => 'e',
            RowAction::Delete => 'd',
            RowAction::Activate => 'a',
            RowAction::Deactivate => 'x',
            RowAction::Restore => 'u',
            RowAction::HardDelete => 'H',
        }
    }

    pub fn color(self) -> Color {
        match self {
            RowAction::View => Color::Cyan,
            RowAction::Edit => Color::Yellow,
            RowAction::Delete => Color::Red,
            RowAction::Activate => Color::Green,
            RowAction::Deactivate => Color::Magenta,
            RowAction::Restore => Color::Green,
            RowAction::HardDelete => Color::Red,
        }
    }
}

/// Entity-level toggles: which verbs this view offers at all.
/// `activate` covers both activate and deactivate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionsConfig {
    pub view: bool,
    pub edit: bool,
    pub delete: bool,
    pub activate: bool,
    pub restore: bool,
    pub hard_delete: bool,
}

impl ActionsConfig {
    /// The usual full set minus hard delete.
    pub fn standard() -> Self {
        ActionsConfig {
            view: true,
            edit: true,
            delete: true,
            activate: true,
            restore: true,
            hard_delete: false,
        }
    }

    pub fn any_enabled(&self) -> bool {
        self.view || self.edit || self.delete || self.activate || self.restore || self.hard_delete
    }
}

/// Closed set of backend roles. Permission lookups key off the variant, so
/// there is no runtime string normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Mecanico,
    Recepcionista,
}

impl Role {
    /// Resolve a backend role name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Role> {
        match name.to_lowercase().as_str() {
            "admin" | "administrador" => Some(Role::Admin),
            "mecanico" | "mecánico" => Some(Role::Mecanico),
            "recepcionista" => Some(Role::Recepcionista),
            _ => None,
        }
    }
}

/// Permission flags resolved from the role matrix. Hard delete is the one
/// verb that must be opted into explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissions {
    pub hard_delete: bool,
}

impl Permissions {
    /// The permission matrix, keyed by role variant. An unknown role (no
    /// variant) gets the default: everything off.
    pub fn for_role(role: Role) -> Permissions {
        match role {
            Role::Admin => Permissions { hard_delete: true },
            Role::Mecanico | Role::Recepcionista => Permissions { hard_delete: false },
        }
    }
}

/// Per-row eligibility, independent of entity-level toggles.
fn eligible(action: RowAction, row: &Row, perms: &Permissions) -> bool {
    match action {
        RowAction::View => true,
        RowAction::Edit | RowAction::Delete => !row.deleted,
        RowAction::Activate => !row.deleted && !row.activo,
        RowAction::Deactivate => !row.deleted && row.activo,
        RowAction::Restore => row.deleted,
        RowAction::HardDelete => row.deleted && perms.hard_delete,
    }
}

/// The actions to render for one row: enabled at the entity level AND
/// eligible for this row's lifecycle state, in declaration order.
pub fn row_actions(config: &ActionsConfig, perms: &Permissions, row: &Row) -> Vec<RowAction> {
    RowAction::ALL
        .into_iter()
        .filter(|action| match action {
            RowAction::View => config.view,
            RowAction::Edit => config.edit,
            RowAction::Delete => config.delete,
            RowAction::Activate | RowAction::Deactivate => config.activate,
            RowAction::Restore => config.restore,
            RowAction::HardDelete => config.hard_delete,
        })
        .filter(|action| eligible(*action, row, perms))
        .collect()
}

/// Verbs that apply to the whole selection in one batched call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Activate,
    Deactivate,
    SoftDelete,
    Restore,
}

impl BulkAction {
    pub const ALL: [BulkAction; 4] = [
        BulkAction::Activate,
        BulkAction::Deactivate,
        BulkAction::SoftDelete,
        BulkAction::Restore,
    ];

    /// Stable key used in caller configuration and logs.
    pub fn key(self) -> &'static str {
        match self {
            BulkAction::Activate => "activate",
            BulkAction::Deactivate => "deactivate",
            BulkAction::SoftDelete => "soft_delete",
            BulkAction::Restore => "restore",
        }
    }

    /// Resolve a configured key; unknown keys get a developer-visible warning
    /// instead of a silent drop.
    pub fn from_key(key: &str) -> Option<BulkAction> {
        let found = BulkAction::ALL.into_iter().find(|a| a.key() == key);
        if found.is_none() {
            tracing::warn!("Unknown bulk action key ignored: {key:?}");
        }
        found
    }

    pub fn label(self) -> &'static str {
        match self {
            BulkAction::Activate => "Activar",
            BulkAction::Deactivate => "Desactivar",
            BulkAction::SoftDelete => "Mover a papelera",
            BulkAction::Restore => "Restaurar",
        }
    }

    pub fn hotkey(self) -> char {
        match self {
            BulkAction::Activate => 'A',
            BulkAction::Deactivate => 'X',
            BulkAction::SoftDelete => 'S',
            BulkAction::Restore => 'U',
        }
    }

    pub fn confirm_title(self) -> &'static str {
        match self {
            BulkAction::Activate => "Activar seleccionados",
            BulkAction::Deactivate => "Desactivar seleccionados",
            BulkAction::SoftDelete => "Mover seleccionados a la papelera",
            BulkAction::Restore => "Restaurar seleccionados",
        }
    }

    /// Confirmation body templated with the selection size.
    pub fn confirm_message(self, count: usize) -> String {
        match self {
            BulkAction::Activate => format!("¿Activar {count} registro(s)?"),
            BulkAction::Deactivate => format!("¿Desactivar {count} registro(s)?"),
            BulkAction::SoftDelete => {
                format!("¿Mover {count} registro(s) a la papelera? Se pueden restaurar después.")
            }
            BulkAction::Restore => format!("¿Restaurar {count} registro(s)?"),
        }
    }
}
