//! Install Planner
//!
//! **[BRN-PLAN-010]** Ordered two-backend package location. The planner
//! asks each backend in turn and returns the first plan produced; both
//! backends coming up empty yields the explicit "failed" plan, never an
//! error. Commands are planned only; execution and privilege elevation
//! belong to the caller.

use async_trait::async_trait;
use omni_common::api::{InstallMethod, InstallPlan};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A package backend that can locate an app and name the command that
/// would install it.
#[async_trait]
pub trait PackageBackend: Send + Sync {
    /// Backend label for logging.
    fn name(&self) -> &'static str;

    /// Locate `app`; `None` means not found (or the lookup tool failed,
    /// which the planner treats the same way).
    async fn locate(&self, app: &str) -> Option<InstallPlan>;
}

/// Ordered planner over the configured backends. First success wins; a
/// later backend is never consulted once an earlier one produced a plan.
pub struct InstallPlanner {
    backends: Vec<Box<dyn PackageBackend>>,
}

impl InstallPlanner {
    pub fn new(backends: Vec<Box<dyn PackageBackend>>) -> Self {
        Self { backends }
    }

    /// The system default: apt first, then flatpak.
    pub fn system_default() -> Self {
        Self::new(vec![Box::new(AptBackend), Box::new(FlatpakBackend)])
    }

    pub async fn plan(&self, app: &str) -> InstallPlan {
        info!(app = %app, "Generating install plan");
        for backend in &self.backends {
            if let Some(plan) = backend.locate(app).await {
                debug!(backend = backend.name(), "Backend produced a plan");
                return plan;
            }
        }
        InstallPlan::failed()
    }
}

// ========================================
// apt backend
// ========================================

/// Exact-name lookup against the apt cache.
pub struct AptBackend;

#[async_trait]
impl PackageBackend for AptBackend {
    fn name(&self) -> &'static str {
        "apt"
    }

    async fn locate(&self, app: &str) -> Option<InstallPlan> {
        // Anchored pattern: only an exact package name counts here
        let output = Command::new("apt-cache")
            .args(["search", "--names-only", &format!("^{}$", app)])
            .output()
            .await;

        let output = match output {
            Ok(out) if out.status.success() => out,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "apt-cache lookup failed");
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let package = parse_apt_output(&stdout)?;
        Some(apt_plan(&package))
    }
}

/// First word of the first non-empty line of `apt-cache search` output.
pub fn parse_apt_output(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find(|line| !line.trim().is_empty())?
        .split_whitespace()
        .next()
        .map(str::to_string)
}

fn apt_plan(package: &str) -> InstallPlan {
    InstallPlan {
        method: InstallMethod::Apt,
        description: format!("Found '{}' in system repositories", package),
        commands: vec![format!("pkexec apt-get install -y {}", package)],
    }
}

// ========================================
// flatpak backend
// ========================================

/// Free-text search against the configured flatpak remotes.
pub struct FlatpakBackend;

#[async_trait]
impl PackageBackend for FlatpakBackend {
    fn name(&self) -> &'static str {
        "flatpak"
    }

    async fn locate(&self, app: &str) -> Option<InstallPlan> {
        let output = Command::new("flatpak").args(["search", app]).output().await;

        let output = match output {
            Ok(out) if out.status.success() => out,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "flatpak lookup failed");
                return None;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let app_id = parse_flatpak_output(&stdout)?;
        Some(flatpak_plan(&app_id))
    }
}

/// Application id from the first `flatpak search` result line.
///
/// Column 3 of the tab-separated output is the id; older flatpak builds
/// emit space-aligned columns instead, where the reverse-domain token (the
/// one containing a '.') is the id.
pub fn parse_flatpak_output(stdout: &str) -> Option<String> {
    let first = stdout.lines().find(|line| !line.trim().is_empty())?;

    let columns: Vec<&str> = first.split('\t').collect();
    if columns.len() > 2 {
        let id = columns[2].trim();
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }

    first
        .split_whitespace()
        .find(|token| token.contains('.'))
        .map(str::to_string)
}

fn flatpak_plan(app_id: &str) -> InstallPlan {
    InstallPlan {
        method: InstallMethod::Flatpak,
        description: format!("Found '{}' in Flatpak", app_id),
        commands: vec![format!("flatpak install -y {}", app_id)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubBackend {
        name: &'static str,
        plan: Option<InstallPlan>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PackageBackend for StubBackend {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn locate(&self, _app: &str) -> Option<InstallPlan> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.plan.clone()
        }
    }

    fn stub(
        name: &'static str,
        plan: Option<InstallPlan>,
    ) -> (Box<dyn PackageBackend>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(StubBackend {
                name,
                plan,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[tokio::test]
    async fn first_hit_wins_and_later_backends_are_not_called() {
        let (apt, apt_calls) = stub("apt", Some(apt_plan("gimp")));
        let (flatpak, flatpak_calls) = stub("flatpak", Some(flatpak_plan("org.gimp.GIMP")));

        let planner = InstallPlanner::new(vec![apt, flatpak]);
        let plan = planner.plan("gimp").await;

        assert_eq!(plan.method, InstallMethod::Apt);
        assert_eq!(apt_calls.load(Ordering::SeqCst), 1);
        assert_eq!(flatpak_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_through_to_the_second_backend() {
        let (apt, _) = stub("apt", None);
        let (flatpak, flatpak_calls) = stub("flatpak", Some(flatpak_plan("org.gimp.GIMP")));

        let planner = InstallPlanner::new(vec![apt, flatpak]);
        let plan = planner.plan("gimp").await;

        assert_eq!(plan.method, InstallMethod::Flatpak);
        assert_eq!(plan.commands, vec!["flatpak install -y org.gimp.GIMP"]);
        assert_eq!(flatpak_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn both_empty_yields_the_failed_plan() {
        let (apt, _) = stub("apt", None);
        let (flatpak, _) = stub("flatpak", None);

        let planner = InstallPlanner::new(vec![apt, flatpak]);
        let plan = planner.plan("no-such-app").await;

        assert_eq!(plan.method, InstallMethod::Failed);
        assert!(plan.commands.is_empty());
    }

    #[test]
    fn apt_output_takes_the_first_word() {
        let out = "gimp - GNU Image Manipulation Program\nother - noise\n";
        assert_eq!(parse_apt_output(out).as_deref(), Some("gimp"));
        assert_eq!(parse_apt_output("\n  \n"), None);
    }

    #[test]
    fn flatpak_output_prefers_the_tab_column() {
        let out = "GIMP\tImage editor\torg.gimp.GIMP\t2.10\tstable\tflathub\n";
        assert_eq!(parse_flatpak_output(out).as_deref(), Some("org.gimp.GIMP"));
    }

    #[test]
    fn flatpak_output_falls_back_to_the_dotted_token() {
        let out = "GIMP Image editor org.gimp.GIMP 2.10 stable flathub\n";
        assert_eq!(parse_flatpak_output(out).as_deref(), Some("org.gimp.GIMP"));
        assert_eq!(parse_flatpak_output("Name Description\n"), None);
    }
}
