//! Two-stage answer checking: exact match first, then per-pair semantic
//! judgment.
//!
//! Both stages sort the answers lexicographically so respondents may fill
//! the slots in any order. The semantic stage pairs sorted submitted[i]
//! with sorted correct[i] positionally. This tolerates free ordering
//! without a bipartite matcher, at the cost of occasionally mis-pairing
//! when two distinct correct answers sort close together; kept
//! deliberately, see DESIGN.md.

use crate::judge::SemanticJudge;
use crate::model::{Question, Verdict};

/// Grade one question against one submitted answer set.
///
/// A short or over-long submission is a grading outcome (wrong count),
/// never an error. A judge failure downgrades that pair to a non-match;
/// the checker itself does not propagate judge errors.
pub async fn check(
    question: &Question,
    submitted: &[String],
    judge: &dyn SemanticJudge,
) -> Verdict {
    if submitted.len() != question.answer_count {
        return Verdict::wrong_count(submitted.to_vec());
    }

    let mut sorted_submitted = submitted.to_vec();
    sorted_submitted.sort();
    let mut sorted_correct = question.correct_answers.clone();
    sorted_correct.sort();

    if sorted_submitted == sorted_correct {
        return Verdict::exact(submitted.to_vec());
    }

    let criteria = question.evaluation_criteria.as_deref();
    let mut matched = 0usize;
    for (answer, reference) in sorted_submitted.iter().zip(&sorted_correct) {
        match judge.judge(answer, reference, criteria).await {
            Ok(true) => matched += 1,
            Ok(false) => {}
            Err(e) => {
                // Degrade this pair to a non-match instead of failing the pass.
                tracing::warn!(
                    ref_number = %question.ref_number,
                    "semantic judgment failed, counting as non-match: {e:#}"
                );
            }
        }
    }

    if matched == question.answer_count {
        Verdict::semantic(submitted.to_vec())
    } else {
        Verdict::partial(submitted.to_vec(), matched, question.answer_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::{FixedJudge, UnavailableJudge};
    use crate::model::MatchKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn question(answers: &[&str]) -> Question {
        Question {
            ref_number: "1.1".into(),
            ref_page: "2-4".into(),
            category: "What is testing?".into(),
            text: "Name the consequences of software not working as expected.".into(),
            answer_count: answers.len(),
            correct_answers: answers.iter().map(|s| s.to_string()).collect(),
            evaluation_criteria: None,
        }
    }

    fn answers(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    /// Judge that records how often it was called.
    struct CountingJudge {
        verdict: bool,
        calls: AtomicUsize,
    }

    impl CountingJudge {
        fn new(verdict: bool) -> Self {
            Self {
                verdict,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SemanticJudge for CountingJudge {
        async fn judge(&self, _: &str, _: &str, _: Option<&str>) -> anyhow::Result<bool> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(self.verdict)
        }
    }

    #[tokio::test]
    async fn exact_match_is_order_independent() {
        let q = question(&["A", "B"]);
        let verdict = check(&q, &answers(&["B", "A"]), &FixedJudge(false)).await;
        assert_eq!(verdict.kind, MatchKind::Exact);
        assert_eq!(verdict.message, "exact match");
    }

    #[tokio::test]
    async fn permuted_multibyte_answers_match_exactly() {
        let q = question(&["経済的な損失", "時間の浪費", "信用の失墜", "傷害と死亡事故"]);
        let submitted = answers(&["時間の浪費", "経済的な損失", "信用の失墜", "傷害と死亡事故"]);
        let verdict = check(&q, &submitted, &FixedJudge(false)).await;
        assert_eq!(verdict.kind, MatchKind::Exact);
    }

    #[tokio::test]
    async fn wrong_count_short_circuits_without_judging() {
        let q = question(&["a", "b", "c", "d"]);
        let judge = CountingJudge::new(true);

        let verdict = check(&q, &answers(&["a", "b"]), &judge).await;
        assert_eq!(verdict.kind, MatchKind::Incorrect);
        assert_eq!(verdict.message, "incorrect answer count");
        assert_eq!(judge.calls.load(Ordering::Relaxed), 0);

        let verdict = check(&q, &answers(&["a", "b", "c", "d", "e"]), &judge).await;
        assert_eq!(verdict.message, "incorrect answer count");
        assert_eq!(judge.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn empty_submission_is_wrong_count() {
        let q = question(&["only answer"]);
        let verdict = check(&q, &[], &FixedJudge(true)).await;
        assert_eq!(verdict.kind, MatchKind::Incorrect);
        assert_eq!(verdict.message, "incorrect answer count");
    }

    #[tokio::test]
    async fn always_yes_judge_gives_semantic_match() {
        let q = question(&["financial loss", "wasted time"]);
        let judge = CountingJudge::new(true);
        let verdict = check(&q, &answers(&["economic loss", "time lost"]), &judge).await;
        assert_eq!(verdict.kind, MatchKind::Semantic);
        assert_eq!(verdict.message, "semantic match");
        // One judgment per answer pair
        assert_eq!(judge.calls.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn partial_match_reports_count() {
        struct AlternatingJudge(AtomicUsize);

        #[async_trait]
        impl SemanticJudge for AlternatingJudge {
            async fn judge(&self, _: &str, _: &str, _: Option<&str>) -> anyhow::Result<bool> {
                Ok(self.0.fetch_add(1, Ordering::Relaxed) % 2 == 0)
            }
        }

        let q = question(&["a", "b"]);
        let verdict = check(&q, &answers(&["x", "y"]), &AlternatingJudge(AtomicUsize::new(0))).await;
        assert_eq!(verdict.kind, MatchKind::Incorrect);
        assert_eq!(verdict.message, "incorrect: 1/2 correct");
    }

    #[tokio::test]
    async fn unavailable_judge_degrades_to_exact_only() {
        let q = question(&["a", "b"]);

        // Non-exact submission fails when the judge is down...
        let verdict = check(&q, &answers(&["x", "y"]), &UnavailableJudge).await;
        assert_eq!(verdict.kind, MatchKind::Incorrect);
        assert_eq!(verdict.message, "incorrect: 0/2 correct");

        // ...but exact submissions still pass.
        let verdict = check(&q, &answers(&["b", "a"]), &UnavailableJudge).await;
        assert_eq!(verdict.kind, MatchKind::Exact);
    }

    #[tokio::test]
    async fn criteria_are_forwarded_to_the_judge() {
        struct CriteriaJudge;

        #[async_trait]
        impl SemanticJudge for CriteriaJudge {
            async fn judge(
                &self,
                _: &str,
                _: &str,
                criteria: Option<&str>,
            ) -> anyhow::Result<bool> {
                Ok(criteria == Some("lenient"))
            }
        }

        let mut q = question(&["a"]);
        q.evaluation_criteria = Some("lenient".into());
        let verdict = check(&q, &answers(&["x"]), &CriteriaJudge).await;
        assert_eq!(verdict.kind, MatchKind::Semantic);
    }
}
