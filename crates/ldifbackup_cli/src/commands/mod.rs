//! CLI command implementations.

pub mod backup;
pub mod split;

use ldifbackup_core::RunSummary;

/// Prints the run summary on stdout, as text or JSON.
pub fn report(summary: &RunSummary, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    if summary.dry_run {
        println!("(dry run - no changes were made)");
    }
    println!("Entries:");
    println!("  Read:              {}", summary.segmenter.entries);
    println!("  Written:           {}", summary.writer.entries_written);
    println!("  Skipped (no key):  {}", summary.writer.entries_skipped);
    println!("  Empty:             {}", summary.writer.empty_entries);
    println!("  Duplicate keys:    {}", summary.writer.duplicate_keys);
    println!("  Attributes hidden: {}", summary.segmenter.attributes_filtered);
    println!();
    println!("Files:");
    println!("  Produced:          {}", summary.files);
    println!("  To add:            {}", summary.to_add);
    println!("  To remove:         {}", summary.to_remove);
    if let Some(store) = &summary.store {
        println!();
        println!("Snapshot:");
        println!("  Staged:            {}", store.staged);
        println!("  Removed:           {}", store.removed);
        println!(
            "  Committed:         {}",
            if store.committed { "yes" } else { "no (unchanged)" }
        );
        if store.compacted {
            println!("  Compacted:         yes");
        }
    }
    println!();
    println!(
        "Took {:.3}s (split {:.3}s, store {:.3}s)",
        (summary.segment_time + summary.store_time).as_secs_f64(),
        summary.segment_time.as_secs_f64(),
        summary.store_time.as_secs_f64()
    );
    Ok(())
}
