use serde::Serialize;
use uuid::Uuid;

use crate::models::Survey;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionCount {
    pub option: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionStats {
    pub question_id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    /// One bucket per distinct option label, in option order.
    pub counts: Vec<OptionCount>,
}

impl QuestionStats {
    pub fn count_for(&self, option: &str) -> Option<u64> {
        self.counts
            .iter()
            .find(|c| c.option == option)
            .map(|c| c.count)
    }
}

pub struct Tabulator;

impl Tabulator {
    /// Counts votes per option for every question, in survey order.
    ///
    /// A response with fewer answers than questions, an empty answer, or an
    /// answer that names no option simply counts as unanswered.
    pub fn compute_stats(survey: &Survey) -> Vec<QuestionStats> {
        survey
            .questions
            .iter()
            .enumerate()
            .map(|(idx, q)| {
                let mut counts: Vec<OptionCount> = Vec::with_capacity(q.options.len());
                for opt in &q.options {
                    if !counts.iter().any(|c| &c.option == opt) {
                        counts.push(OptionCount {
                            option: opt.clone(),
                            count: 0,
                        });
                    }
                }

                for resp in &survey.responses {
                    let Some(answer) = resp.answer_for(idx) else {
                        continue;
                    };
                    if let Some(bucket) = counts.iter_mut().find(|c| c.option == answer) {
                        bucket.count += 1;
                    }
                }

                QuestionStats {
                    question_id: q.id,
                    text: q.text.clone(),
                    options: q.options.clone(),
                    counts,
                }
            })
            .collect()
    }

    /// Share of `total` in percent, rounded to one decimal. Zero when nobody
    /// has responded yet.
    pub fn percentage(count: u64, total: u64) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let raw = count as f64 / total as f64 * 100.0;
        (raw * 10.0).round() / 10.0
    }
}
