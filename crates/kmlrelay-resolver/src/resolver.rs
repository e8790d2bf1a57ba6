use async_trait::async_trait;

use crate::model::{find_area_file_url, FileReference, Proposal, Radio};

/// Collections filled in by the external KML processing pipeline. Explicit
/// state in and out keeps the resolution functions pure; the page that owns
/// the proposal owns this value.
#[derive(Debug)]
pub struct CoverageState<A> {
    pub areas_of_interest: Vec<A>,
    pub filtered: Vec<A>,
}

impl<A> Default for CoverageState<A> {
    fn default() -> Self {
        Self {
            areas_of_interest: Vec::new(),
            filtered: Vec::new(),
        }
    }
}

/// External collaborators: the KML processor plus the two analysis steps.
/// Errors are not caught by the resolver; a failed hook propagates to the
/// caller unchanged.
#[async_trait]
pub trait CoverageHooks {
    /// Parsed area record produced by the KML processor.
    type Area: Send;

    /// Download and parse the coverage file behind `url`, filling
    /// `state.areas_of_interest`. Suspends until processing completes.
    async fn process_kml(
        &self,
        url: &str,
        state: &mut CoverageState<Self::Area>,
    ) -> anyhow::Result<()>;

    /// Coverage analysis across the whole proposal.
    async fn analyze_proposal(&self, state: &mut CoverageState<Self::Area>) -> anyhow::Result<()>;

    /// Per-radio filtering of the parsed areas, filling `state.filtered`.
    async fn filter_for_radio(
        &self,
        radio: &Radio,
        state: &mut CoverageState<Self::Area>,
    ) -> anyhow::Result<()>;
}

/// What a resolution pass did, so callers can branch without re-inspecting
/// the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A file URL was processed and the downstream analysis step ran.
    Analyzed,
    /// A file URL was processed but yielded no areas; analysis was skipped.
    ProcessedEmpty,
    /// No entry resolved to a URL; the state collections were reset.
    NoFileFound,
}

/// Proposal mode: scan the proposal's radios for the first resolvable
/// areas-of-interest file, process it, and run the proposal-wide analysis
/// when processing produced areas. A miss resets the areas collection.
pub async fn resolve_for_proposal<H>(
    proposal: &Proposal,
    hooks: &H,
    state: &mut CoverageState<H::Area>,
) -> anyhow::Result<Outcome>
where
    H: CoverageHooks,
{
    let Some(url) = find_area_file_url(&proposal.radios) else {
        tracing::info!("no areas-of-interest file on any radio, clearing state");
        state.areas_of_interest.clear();
        return Ok(Outcome::NoFileFound);
    };

    tracing::info!("processing areas-of-interest file url={url}");
    hooks.process_kml(url, state).await?;
    if state.areas_of_interest.is_empty() {
        return Ok(Outcome::ProcessedEmpty);
    }
    hooks.analyze_proposal(state).await?;
    Ok(Outcome::Analyzed)
}

/// Individual mode: same resolution against a single pre-selected radio. A
/// miss resets both the areas collection and the per-radio filtered
/// collection; a hit runs the per-radio filter instead of the proposal-wide
/// analysis.
pub async fn resolve_for_radio<H>(
    radio: &Radio,
    hooks: &H,
    state: &mut CoverageState<H::Area>,
) -> anyhow::Result<Outcome>
where
    H: CoverageHooks,
{
    let url = radio
        .areas_of_interest
        .first()
        .and_then(FileReference::resolve_url);
    let Some(url) = url else {
        tracing::info!("radio has no areas-of-interest file, clearing state");
        state.areas_of_interest.clear();
        state.filtered.clear();
        return Ok(Outcome::NoFileFound);
    };

    tracing::info!("processing areas-of-interest file url={url}");
    hooks.process_kml(url, state).await?;
    if state.areas_of_interest.is_empty() {
        return Ok(Outcome::ProcessedEmpty);
    }
    hooks.filter_for_radio(radio, state).await?;
    Ok(Outcome::Analyzed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileUrl;
    use futures::executor::block_on;
    use std::sync::Mutex;

    struct RecordingHooks {
        calls: Mutex<Vec<String>>,
        areas_per_process: usize,
    }

    impl RecordingHooks {
        fn new(areas_per_process: usize) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                areas_per_process,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CoverageHooks for RecordingHooks {
        type Area = String;

        async fn process_kml(
            &self,
            url: &str,
            state: &mut CoverageState<String>,
        ) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(format!("process:{url}"));
            for index in 0..self.areas_per_process {
                state.areas_of_interest.push(format!("area-{index}"));
            }
            Ok(())
        }

        async fn analyze_proposal(&self, _state: &mut CoverageState<String>) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push("analyze".to_string());
            Ok(())
        }

        async fn filter_for_radio(
            &self,
            _radio: &Radio,
            state: &mut CoverageState<String>,
        ) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push("filter".to_string());
            state.filtered = state.areas_of_interest.clone();
            Ok(())
        }
    }

    struct FailingHooks;

    #[async_trait]
    impl CoverageHooks for FailingHooks {
        type Area = String;

        async fn process_kml(
            &self,
            _url: &str,
            _state: &mut CoverageState<String>,
        ) -> anyhow::Result<()> {
            anyhow::bail!("kml fetch failed")
        }

        async fn analyze_proposal(&self, _state: &mut CoverageState<String>) -> anyhow::Result<()> {
            Ok(())
        }

        async fn filter_for_radio(
            &self,
            _radio: &Radio,
            _state: &mut CoverageState<String>,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn direct(url: &str) -> FileReference {
        FileReference::Direct {
            url: url.to_string(),
        }
    }

    fn radio(entries: Vec<FileReference>) -> Radio {
        Radio {
            areas_of_interest: entries,
        }
    }

    fn proposal(radios: Vec<Radio>) -> Proposal {
        Proposal { radios }
    }

    #[test]
    fn proposal_mode_processes_first_resolvable_entry_then_analyzes() {
        let hooks = RecordingHooks::new(2);
        let mut state = CoverageState::default();
        let proposal = proposal(vec![
            radio(vec![]),
            radio(vec![direct("http://x/a.kml")]),
            radio(vec![direct("http://x/never.kml")]),
        ]);

        let outcome =
            block_on(resolve_for_proposal(&proposal, &hooks, &mut state)).expect("resolve");
        assert_eq!(outcome, Outcome::Analyzed);
        assert_eq!(hooks.calls(), vec!["process:http://x/a.kml", "analyze"]);
        assert_eq!(state.areas_of_interest.len(), 2);
    }

    #[test]
    fn proposal_mode_resolves_nested_file_form() {
        let hooks = RecordingHooks::new(1);
        let mut state = CoverageState::default();
        let proposal = proposal(vec![radio(vec![FileReference::Upload {
            file: FileUrl {
                url: "http://x/b.kml".to_string(),
            },
        }])]);

        block_on(resolve_for_proposal(&proposal, &hooks, &mut state)).expect("resolve");
        assert_eq!(hooks.calls()[0], "process:http://x/b.kml");
    }

    #[test]
    fn proposal_mode_miss_resets_state_without_processing() {
        let hooks = RecordingHooks::new(1);
        let mut state = CoverageState {
            areas_of_interest: vec!["stale".to_string()],
            filtered: vec!["kept".to_string()],
        };
        let proposal = proposal(vec![radio(vec![]), radio(vec![direct("")])]);

        let outcome =
            block_on(resolve_for_proposal(&proposal, &hooks, &mut state)).expect("resolve");
        assert_eq!(outcome, Outcome::NoFileFound);
        assert!(hooks.calls().is_empty());
        assert!(state.areas_of_interest.is_empty());
        // Proposal mode leaves the per-radio filtered collection alone.
        assert_eq!(state.filtered, vec!["kept".to_string()]);
    }

    #[test]
    fn proposal_mode_skips_analysis_when_processing_yields_nothing() {
        let hooks = RecordingHooks::new(0);
        let mut state = CoverageState::default();
        let proposal = proposal(vec![radio(vec![direct("http://x/a.kml")])]);

        let outcome =
            block_on(resolve_for_proposal(&proposal, &hooks, &mut state)).expect("resolve");
        assert_eq!(outcome, Outcome::ProcessedEmpty);
        assert_eq!(hooks.calls(), vec!["process:http://x/a.kml"]);
    }

    #[test]
    fn individual_mode_runs_filter_instead_of_analysis() {
        let hooks = RecordingHooks::new(3);
        let mut state = CoverageState::default();
        let radio = radio(vec![FileReference::External {
            external: FileUrl {
                url: "http://x/c.kml".to_string(),
            },
        }]);

        let outcome = block_on(resolve_for_radio(&radio, &hooks, &mut state)).expect("resolve");
        assert_eq!(outcome, Outcome::Analyzed);
        assert_eq!(hooks.calls(), vec!["process:http://x/c.kml", "filter"]);
        assert_eq!(state.filtered.len(), 3);
    }

    #[test]
    fn individual_mode_miss_resets_both_collections() {
        let hooks = RecordingHooks::new(1);
        let mut state = CoverageState {
            areas_of_interest: vec!["stale".to_string()],
            filtered: vec!["stale".to_string()],
        };
        let radio = radio(vec![]);

        let outcome = block_on(resolve_for_radio(&radio, &hooks, &mut state)).expect("resolve");
        assert_eq!(outcome, Outcome::NoFileFound);
        assert!(hooks.calls().is_empty());
        assert!(state.areas_of_interest.is_empty());
        assert!(state.filtered.is_empty());
    }

    #[test]
    fn individual_mode_only_consults_the_first_entry() {
        let hooks = RecordingHooks::new(1);
        let mut state = CoverageState::default();
        let radio = radio(vec![direct(""), direct("http://x/second.kml")]);

        let outcome = block_on(resolve_for_radio(&radio, &hooks, &mut state)).expect("resolve");
        assert_eq!(outcome, Outcome::NoFileFound);
        assert!(hooks.calls().is_empty());
    }

    #[test]
    fn hook_failure_propagates_to_the_caller() {
        let mut state = CoverageState::default();
        let proposal = proposal(vec![radio(vec![direct("http://x/a.kml")])]);

        let err = block_on(resolve_for_proposal(&proposal, &FailingHooks, &mut state))
            .expect_err("error");
        assert!(err.to_string().contains("kml fetch failed"));
    }
}
