use serde::{Deserialize, Serialize};

/// Project lifecycle status, persisted as an integer code.
///
/// The review chain is linear: submission lands directly in supply-chain
/// review, planning review fans out per location, and completion is only
/// reachable from an approved project whose delivery window has passed.
/// Archiving is an orthogonal flag on terminal statuses, not a status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Erfassung,
    PruefungVertrieb,
    PruefungSupplyChain,
    PruefungPlanung,
    Genehmigt,
    Abgelehnt,
    Abgeschlossen,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 7] = [
        ProjectStatus::Erfassung,
        ProjectStatus::PruefungVertrieb,
        ProjectStatus::PruefungSupplyChain,
        ProjectStatus::PruefungPlanung,
        ProjectStatus::Genehmigt,
        ProjectStatus::Abgelehnt,
        ProjectStatus::Abgeschlossen,
    ];

    pub fn code(self) -> i64 {
        match self {
            ProjectStatus::Erfassung => 1,
            ProjectStatus::PruefungVertrieb => 2,
            ProjectStatus::PruefungSupplyChain => 3,
            ProjectStatus::PruefungPlanung => 4,
            ProjectStatus::Genehmigt => 5,
            ProjectStatus::Abgelehnt => 6,
            ProjectStatus::Abgeschlossen => 7,
        }
    }

    /// Status is persisted as an untyped integer; unknown codes resolve to
    /// `None` and the registry falls back to a safe unknown label.
    pub fn from_code(code: i64) -> Option<ProjectStatus> {
        match code {
            1 => Some(ProjectStatus::Erfassung),
            2 => Some(ProjectStatus::PruefungVertrieb),
            3 => Some(ProjectStatus::PruefungSupplyChain),
            4 => Some(ProjectStatus::PruefungPlanung),
            5 => Some(ProjectStatus::Genehmigt),
            6 => Some(ProjectStatus::Abgelehnt),
            7 => Some(ProjectStatus::Abgeschlossen),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProjectStatus::Erfassung => "Erfassung",
            ProjectStatus::PruefungVertrieb => "Prüfung Vertrieb",
            ProjectStatus::PruefungSupplyChain => "Prüfung Supply Chain",
            ProjectStatus::PruefungPlanung => "Prüfung Planung",
            ProjectStatus::Genehmigt => "Genehmigt",
            ProjectStatus::Abgelehnt => "Abgelehnt",
            ProjectStatus::Abgeschlossen => "Abgeschlossen",
        }
    }

    pub fn color_class(self) -> &'static str {
        match self {
            ProjectStatus::Erfassung => "status-draft",
            ProjectStatus::PruefungVertrieb => "status-review",
            ProjectStatus::PruefungSupplyChain => "status-review",
            ProjectStatus::PruefungPlanung => "status-review",
            ProjectStatus::Genehmigt => "status-approved",
            ProjectStatus::Abgelehnt => "status-rejected",
            ProjectStatus::Abgeschlossen => "status-completed",
        }
    }

    /// Archiving is permitted exactly on the terminal-ish statuses.
    pub fn is_archivable(self) -> bool {
        matches!(
            self,
            ProjectStatus::Genehmigt | ProjectStatus::Abgelehnt | ProjectStatus::Abgeschlossen
        )
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Display info for a persisted status code, tolerant of unknown values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo {
    pub label: &'static str,
    pub color_class: &'static str,
    pub archivable: bool,
}

/// Resolve a raw status code to display info. Unknown codes get a neutral
/// "Unbekannt" entry rather than an error; stale rows must stay renderable.
pub fn status_info(code: i64) -> StatusInfo {
    match ProjectStatus::from_code(code) {
        Some(status) => StatusInfo {
            label: status.label(),
            color_class: status.color_class(),
            archivable: status.is_archivable(),
        },
        None => StatusInfo {
            label: "Unbekannt",
            color_class: "status-unknown",
            archivable: false,
        },
    }
}
