//! Pure access decisions over an optional user profile.
//!
//! Absence of permission is always `false` or an empty list, never an error.
//! A missing profile yields no access.

use crate::{MenuItem, PermissionLevel, Role, Section, UserProfile};

/// Outcome of checking whether a user may change an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModificationDecision {
    /// The change may proceed.
    Allowed,
    /// The change needs an active approved permission request.
    RequiresApproval,
    /// The change is not permitted at all.
    Denied,
}

/// Returns whether the user may open a section.
#[must_use]
pub fn can_access_section(user: Option<&UserProfile>, section: Section) -> bool {
    let Some(user) = user else {
        return false;
    };

    match user.role() {
        Role::SuperAdmin | Role::Admin => true,
        Role::DataPersonnel => user.assigned_sections().contains(&section),
        Role::Member => true,
        Role::Guest => false,
    }
}

/// Returns whether the user may manage accounts.
#[must_use]
pub fn can_manage_users(user: Option<&UserProfile>) -> bool {
    user.is_some_and(|user| user.role().capabilities().can_manage_users)
}

/// Returns whether the user may assign sections to data personnel.
#[must_use]
pub fn can_manage_data_personnel(user: Option<&UserProfile>) -> bool {
    user.is_some_and(|user| user.role().capabilities().can_manage_data_personnel)
}

/// Returns whether the user may administer the recycle bin and review requests.
#[must_use]
pub fn can_administer(user: Option<&UserProfile>) -> bool {
    user.is_some_and(|user| user.role().capabilities().can_access_all)
}

/// Returns whether the user may write data in a section.
///
/// Administrative roles always may. A `Viewer` level blocks everyone else.
/// Data personnel need the section assigned; members need an explicit
/// `Editor` level; guests never edit.
#[must_use]
pub fn can_edit_data(user: Option<&UserProfile>, section: Section) -> bool {
    let Some(user) = user else {
        return false;
    };

    if user.role().capabilities().can_access_all {
        return true;
    }

    if user.permission_level() == Some(PermissionLevel::Viewer) {
        return false;
    }

    match user.role() {
        Role::DataPersonnel => user.assigned_sections().contains(&section),
        Role::Member => user.permission_level() == Some(PermissionLevel::Editor),
        Role::Guest | Role::SuperAdmin | Role::Admin => false,
    }
}

/// Decides whether the user may edit or delete an existing record.
///
/// Roles flagged `needs_permission_request` change their own records freely
/// when they can edit the section; anything else needs an approved request.
#[must_use]
pub fn modification_decision(
    user: Option<&UserProfile>,
    section: Section,
    originated_by_user: bool,
) -> ModificationDecision {
    let Some(profile) = user else {
        return ModificationDecision::Denied;
    };

    if !can_access_section(user, section) {
        return ModificationDecision::Denied;
    }

    let capabilities = profile.role().capabilities();
    if capabilities.can_access_all {
        return ModificationDecision::Allowed;
    }

    let can_edit = can_edit_data(user, section);
    if capabilities.needs_permission_request {
        if can_edit && originated_by_user {
            return ModificationDecision::Allowed;
        }
        return ModificationDecision::RequiresApproval;
    }

    if can_edit {
        ModificationDecision::Allowed
    } else {
        ModificationDecision::Denied
    }
}

/// Returns the navigation entries visible to the user.
#[must_use]
pub fn accessible_menu_items(user: Option<&UserProfile>) -> Vec<MenuItem> {
    let Some(user) = user else {
        return Vec::new();
    };

    if user.role().capabilities().can_access_all {
        let mut items = vec![MenuItem::Dashboard];
        items.extend(Section::all().iter().copied().map(MenuItem::Section));
        items.extend([
            MenuItem::RecycleBin,
            MenuItem::PermissionRequests,
            MenuItem::UserManagement,
            MenuItem::Settings,
        ]);
        return items;
    }

    if user.role() == Role::DataPersonnel {
        let mut items = vec![MenuItem::Dashboard];
        items.extend(
            user.assigned_sections()
                .iter()
                .copied()
                .map(MenuItem::Section),
        );
        items.push(MenuItem::Settings);
        return items;
    }

    vec![MenuItem::Dashboard]
}
