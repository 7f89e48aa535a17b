/*!
 * Integration tests: recorded captures replayed through the reconciler
 */

use anyhow::Result;
use chrono::Duration;

use livesub::app_config::Config;
use livesub::reconcile::fallback::{IncrementalDelta, OverlapSlice};
use livesub::reflow::reflow_entries;
use livesub::replay::{parse_replay, ReplayFormat};
use livesub::session::{CaptureSession, Reconciler, SessionStats};
use livesub::subtitle_processor::{SharedUnits, SubtitleCollection};

use crate::common;

/// A caption region that scrolls its first line away, then is cleared
const ROLLING_CAPTURE: &str = "\
Hello everyone
Hello everyone
Hello everyone welcome to
Hello everyone welcome to the show
welcome to the show today we
welcome to the show today we talk
---
new speaker here
";

fn replay(config: &Config, input: &str) -> Result<(SharedUnits, SessionStats)> {
    let events = parse_replay(input, ReplayFormat::Plain, common::t0(), Duration::milliseconds(200))?;
    let units = SubtitleCollection::shared();
    let mut reconciler = Reconciler::new(config, units.clone());
    for event in events {
        reconciler.handle(event);
    }
    reconciler.finish();
    Ok((units, reconciler.into_stats()))
}

fn unit_texts(units: &SharedUnits) -> Vec<String> {
    units.lock().entries.iter().map(|u| u.text.clone()).collect()
}

#[test]
fn test_rollingCapture_withShortAnchor_shouldReattachCleanly() -> Result<()> {
    common::init_logging();
    let (units, stats) = replay(&common::gate_config(10, 10, 6), ROLLING_CAPTURE)?;

    assert_eq!(
        unit_texts(&units),
        vec!["Hello everyone welcome to the show today we talk", "new speaker here"]
    );
    assert_eq!(stats.duplicates, 1);
    assert_eq!(stats.desyncs, 0);
    assert_eq!(stats.full_resets, 1);
    Ok(())
}

#[test]
fn test_rollingCapture_withDefaultAnchor_shouldRecoverThroughFallbacks() -> Result<()> {
    let (units, stats) = replay(&Config::default(), ROLLING_CAPTURE)?;

    assert_eq!(
        unit_texts(&units),
        vec!["Hello everyone welcome to the show today we talk", "new speaker here"]
    );
    assert_eq!(stats.desyncs, 2);
    assert_eq!(stats.fallback_recoveries.get(OverlapSlice::NAME), Some(&1));
    assert_eq!(stats.fallback_recoveries.get(IncrementalDelta::NAME), Some(&1));
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.soft_resyncs, 0);
    Ok(())
}

#[test]
fn test_slowCapture_shouldSplitOnTimeCeiling() -> Result<()> {
    let input = "\
{\"type\":\"snapshot\",\"text\":\"first words\",\"at_ms\":0}
{\"type\":\"snapshot\",\"text\":\"first words then more\",\"at_ms\":2000}
{\"type\":\"tick\",\"at_ms\":6000}
{\"type\":\"snapshot\",\"text\":\"first words then more after a pause\",\"at_ms\":9000}
";
    let events = parse_replay(input, ReplayFormat::JsonLines, common::t0(), Duration::milliseconds(200))?;
    let units = SubtitleCollection::shared();
    let mut reconciler = Reconciler::new(&Config::default(), units.clone());
    for event in events {
        reconciler.handle(event);
    }
    reconciler.finish();

    let units = units.lock();
    assert_eq!(units.len(), 2);
    assert_eq!(units.entries[0].text, "first words then more");
    assert_eq!(units.entries[0].end_time, common::at_ms(6000));
    assert_eq!(units.entries[1].text, "after a pause");
    assert_eq!(units.entries[1].start_time, common::at_ms(9000));
    Ok(())
}

#[tokio::test]
async fn test_replayThroughSession_thenReflow_shouldProduceSentences() -> Result<()> {
    let input = "\
Thanks for joining. Today we
Thanks for joining. Today we cover
Thanks for joining. Today we cover the roadmap. Questions
Thanks for joining. Today we cover the roadmap. Questions at the end.
";
    let events = parse_replay(input, ReplayFormat::Plain, common::t0(), Duration::milliseconds(500))?;
    let session = CaptureSession::start(&Config::default());
    for event in events {
        session.send(event).await?;
    }
    let report = session.finalize_all().await?;
    assert_eq!(report.units.len(), 1);

    let reflowed = reflow_entries(&report.units);
    let texts: Vec<&str> = reflowed.iter().map(|u| u.text.as_str()).collect();
    assert_eq!(
        texts,
        vec![
            "Thanks for joining.",
            "Today we cover the roadmap.",
            "Questions at the end."
        ]
    );
    Ok(())
}
