use std::str::FromStr;

use ecclesia_core::AppError;
use serde::{Deserialize, Serialize};

/// Named screens used both for navigation and as the unit of section grants.
///
/// Declaration order is the navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Section {
    /// Member directory.
    #[serde(rename = "Members")]
    Members,
    /// Member registration form.
    #[serde(rename = "Add Member")]
    AddMember,
    /// Fellowship and ministry groups.
    #[serde(rename = "Groups")]
    Groups,
    /// Service attendance capture.
    #[serde(rename = "Attendance")]
    Attendance,
    /// Attendance summaries.
    #[serde(rename = "Attendance Reports")]
    AttendanceReports,
    /// Ledger overview.
    #[serde(rename = "Finance")]
    Finance,
    /// Income and expense entry.
    #[serde(rename = "Add Transaction")]
    AddTransaction,
    /// Financial summaries.
    #[serde(rename = "Financial Reports")]
    FinancialReports,
    /// Equipment inventory.
    #[serde(rename = "Equipment")]
    Equipment,
    /// Equipment registration form.
    #[serde(rename = "Add Equipment")]
    AddEquipment,
    /// Equipment maintenance log.
    #[serde(rename = "Maintenance")]
    Maintenance,
    /// Visitor register.
    #[serde(rename = "Visitors")]
    Visitors,
    /// Visitor registration form.
    #[serde(rename = "Add Visitor")]
    AddVisitor,
    /// Visitor follow-up tracking.
    #[serde(rename = "Follow-ups")]
    FollowUps,
    /// Church branches.
    #[serde(rename = "Branches")]
    Branches,
    /// SMS broadcast composer.
    #[serde(rename = "Send SMS")]
    SendSms,
    /// Sent SMS log.
    #[serde(rename = "SMS History")]
    SmsHistory,
}

/// Presentation grouping of sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionModule {
    /// Member records and groups.
    Members,
    /// Attendance capture and reporting.
    Attendance,
    /// Transactions and reports.
    Finance,
    /// Inventory and maintenance.
    Equipment,
    /// Visitors and follow-ups.
    Visitors,
    /// Branch records.
    Branches,
    /// SMS broadcast.
    Sms,
}

impl Section {
    /// Returns the display name, which is also the transport value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Members => "Members",
            Self::AddMember => "Add Member",
            Self::Groups => "Groups",
            Self::Attendance => "Attendance",
            Self::AttendanceReports => "Attendance Reports",
            Self::Finance => "Finance",
            Self::AddTransaction => "Add Transaction",
            Self::FinancialReports => "Financial Reports",
            Self::Equipment => "Equipment",
            Self::AddEquipment => "Add Equipment",
            Self::Maintenance => "Maintenance",
            Self::Visitors => "Visitors",
            Self::AddVisitor => "Add Visitor",
            Self::FollowUps => "Follow-ups",
            Self::Branches => "Branches",
            Self::SendSms => "Send SMS",
            Self::SmsHistory => "SMS History",
        }
    }

    /// Returns the module this section is listed under.
    #[must_use]
    pub fn module(&self) -> SectionModule {
        match self {
            Self::Members | Self::AddMember | Self::Groups => SectionModule::Members,
            Self::Attendance | Self::AttendanceReports => SectionModule::Attendance,
            Self::Finance | Self::AddTransaction | Self::FinancialReports => SectionModule::Finance,
            Self::Equipment | Self::AddEquipment | Self::Maintenance => SectionModule::Equipment,
            Self::Visitors | Self::AddVisitor | Self::FollowUps => SectionModule::Visitors,
            Self::Branches => SectionModule::Branches,
            Self::SendSms | Self::SmsHistory => SectionModule::Sms,
        }
    }

    /// Returns every section in navigation order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Section] = &[
            Section::Members,
            Section::AddMember,
            Section::Groups,
            Section::Attendance,
            Section::AttendanceReports,
            Section::Finance,
            Section::AddTransaction,
            Section::FinancialReports,
            Section::Equipment,
            Section::AddEquipment,
            Section::Maintenance,
            Section::Visitors,
            Section::AddVisitor,
            Section::FollowUps,
            Section::Branches,
            Section::SendSms,
            Section::SmsHistory,
        ];

        ALL
    }

    /// Parses a transport value into a section.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Section {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|section| section.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown section '{value}'")))
    }
}

/// Navigation entries rendered in the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItem {
    /// Landing page, always first.
    Dashboard,
    /// A data section.
    Section(Section),
    /// Soft-deleted records.
    RecycleBin,
    /// Pending edit and delete approvals.
    PermissionRequests,
    /// Account administration.
    UserManagement,
    /// Personal settings, always last.
    Settings,
}

impl MenuItem {
    /// Returns the label shown in navigation.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Section(section) => section.as_str(),
            Self::RecycleBin => "Recycle Bin",
            Self::PermissionRequests => "Permission Requests",
            Self::UserManagement => "User Management",
            Self::Settings => "Settings",
        }
    }
}
