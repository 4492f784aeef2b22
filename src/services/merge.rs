use serde::Serialize;

use crate::model::catalog::{Catalog, TsContext};
use crate::model::message::{Message, TranslationState};
use crate::services::memory::{hash, matcher, model::MemoryEntry, normalize};

#[derive(Debug, Serialize, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Template messages with no counterpart in the old catalog.
    pub added: usize,
    /// Messages whose id and source are unchanged.
    pub kept: usize,
    /// Messages whose source text changed; translation kept, state reset.
    pub changed: usize,
    /// Old messages no longer present in the template.
    pub vanished: usize,
    /// New messages pre-filled from the translation memory.
    pub from_memory: usize,
}

/// Merge a regenerated source template into an existing, possibly partly
/// translated catalog.
///
/// The result follows the template's context layout and message order. Old
/// messages absent from the template are carried along marked `vanished`
/// so translators can still see their text. Finished translations from the
/// old catalog are fed into `memory`.
pub fn merge(
    existing: &Catalog,
    template: &Catalog,
    memory: &mut Vec<MemoryEntry>,
) -> (Catalog, MergeReport) {
    let mut report = MergeReport::default();

    let source_language = if !template.source_language.is_empty() {
        template.source_language.clone()
    } else {
        existing.source_language.clone()
    };
    let target_language = existing.language.clone();

    // Remember every finished pair before matching, so renamed ids can be
    // recovered through the memory below.
    if !target_language.is_empty() && target_language != source_language {
        for m in existing.messages() {
            if m.state == TranslationState::Finished && !m.translation.trim().is_empty() {
                let norm = normalize::normalize(&m.source);
                let h = hash::hash_norm(&norm);
                memory.push(MemoryEntry {
                    source_language: source_language.clone(),
                    target_language: target_language.clone(),
                    source: m.source.clone(),
                    translation: m.translation.clone(),
                    normalized: norm,
                    hash: h,
                });
            }
        }
    }

    let mut merged = Catalog::new(&target_language, &source_language);
    merged.version = template.version.clone();

    for tctx in &template.contexts {
        let mut out = TsContext {
            name: tctx.name.clone(),
            messages: Vec::with_capacity(tctx.messages.len()),
        };

        for tmsg in &tctx.messages {
            out.messages.push(merge_message(
                tmsg,
                existing,
                memory,
                &source_language,
                &target_language,
                &mut report,
            ));
        }

        merged.contexts.push(out);
    }

    carry_vanished(existing, &mut merged, &mut report);

    (merged, report)
}

fn merge_message(
    tmsg: &Message,
    existing: &Catalog,
    memory: &[MemoryEntry],
    source_language: &str,
    target_language: &str,
    report: &mut MergeReport,
) -> Message {
    let mut out = tmsg.clone();
    out.state = TranslationState::Unfinished;

    match existing.find(&tmsg.id) {
        Some(old) if old.source == tmsg.source => {
            out.translation = old.translation.clone();
            // A revived message never comes back as vanished or obsolete.
            out.state = match old.state {
                TranslationState::Finished => TranslationState::Finished,
                _ => TranslationState::Unfinished,
            };
            report.kept += 1;
        }
        Some(old) => {
            // Source text changed under the same id: the old translation is
            // probably close, keep it but force a review.
            out.translation = old.translation.clone();
            report.changed += 1;
        }
        None => {
            let from_memory = if target_language.is_empty() || target_language == source_language {
                None
            } else {
                matcher::exact_match(memory, source_language, target_language, &tmsg.source)
            };
            match from_memory {
                Some(hit) => {
                    out.translation = hit.translation.clone();
                    report.from_memory += 1;
                }
                None => report.added += 1,
            }
        }
    }

    out
}

fn carry_vanished(existing: &Catalog, merged: &mut Catalog, report: &mut MergeReport) {
    for ectx in &existing.contexts {
        let mut leftovers: Vec<Message> = Vec::new();

        for m in &ectx.messages {
            if merged.find(&m.id).is_some() {
                continue;
            }
            let mut gone = m.clone();
            if gone.state != TranslationState::Obsolete {
                if gone.state != TranslationState::Vanished {
                    report.vanished += 1;
                }
                gone.state = TranslationState::Vanished;
            }
            leftovers.push(gone);
        }

        if leftovers.is_empty() {
            continue;
        }

        match merged.contexts.iter_mut().find(|c| c.name == ectx.name) {
            Some(target) => target.messages.extend(leftovers),
            None => merged.contexts.push(TsContext {
                name: ectx.name.clone(),
                messages: leftovers,
            }),
        }
    }
}
