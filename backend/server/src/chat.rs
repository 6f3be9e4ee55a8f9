use tracing::info;

use crate::{doctors::DoctorDirectory, error::AppError, gemini::TextGenerator};

pub const MISSING_SYMPTOM: &str = "Please enter symptoms!";
pub const AI_PLACEHOLDER: &str = "AI response not available.";

pub fn build_prompt(symptom: &str) -> String {
    format!("Explain the condition for symptom: {symptom} in simple terms.")
}

pub fn compose(ai_text: &str, recommendation: &str) -> String {
    format!("{ai_text}\n\n{recommendation}")
}

/// Explanation from the generator followed by the doctor recommendation.
///
/// Only a blank symptom or a failed generator call is an error; a response
/// without usable text is replaced by [`AI_PLACEHOLDER`].
pub async fn analyze(
    generator: &dyn TextGenerator,
    directory: &DoctorDirectory,
    symptom: &str,
) -> Result<String, AppError> {
    if symptom.trim().is_empty() {
        return Err(AppError::InvalidInput(MISSING_SYMPTOM));
    }

    let response = generator.generate(&build_prompt(symptom)).await?;
    let ai_text = response.first_text().unwrap_or(AI_PLACEHOLDER);

    info!("AI response: {ai_text}");

    Ok(compose(ai_text, &directory.recommend(symptom)))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{
        doctors::NO_RECOMMENDATION,
        gemini::{GenerateContentResponse, GeneratorError},
    };

    pub(crate) enum Reply {
        Text(&'static str),
        Empty,
        Fail,
    }

    pub(crate) struct FakeGenerator {
        reply: Reply,
        pub calls: AtomicUsize,
        pub prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        pub(crate) fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for FakeGenerator {
        async fn generate(&self, prompt: &str) -> Result<GenerateContentResponse, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());

            match self.reply {
                Reply::Text(text) => Ok(GenerateContentResponse::from_text(text)),
                Reply::Empty => Ok(GenerateContentResponse::default()),
                Reply::Fail => Err(GeneratorError::Status {
                    status: 429,
                    body: "quota exceeded".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_composes_text_and_recommendation() {
        let generator = FakeGenerator::new(Reply::Text("Fever is a raised temperature."));
        let directory = DoctorDirectory::default();

        let response = analyze(&generator, &directory, "High Fever").await.unwrap();

        assert_eq!(
            response,
            "Fever is a raised temperature.\n\nRecommended Doctor: Dr. Padmapriya (Specialist: General Physician)"
        );
        assert_eq!(
            generator.prompts.lock().unwrap().as_slice(),
            ["Explain the condition for symptom: High Fever in simple terms."]
        );
    }

    #[tokio::test]
    async fn test_blank_symptom_skips_generator() {
        let generator = FakeGenerator::new(Reply::Text("unused"));
        let directory = DoctorDirectory::default();

        for symptom in ["", "   ", "\n\t"] {
            let err = analyze(&generator, &directory, symptom).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(MISSING_SYMPTOM)));
        }

        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_candidates_uses_placeholder() {
        let generator = FakeGenerator::new(Reply::Empty);
        let directory = DoctorDirectory::default();

        let response = analyze(&generator, &directory, "joint pain").await.unwrap();

        assert_eq!(
            response,
            compose(
                AI_PLACEHOLDER,
                "Recommended Doctor: Dr. Naveen (Specialist: Orthopedic)"
            )
        );
    }

    #[tokio::test]
    async fn test_generator_failure() {
        let generator = FakeGenerator::new(Reply::Fail);
        let directory = DoctorDirectory::default();

        let err = analyze(&generator, &directory, "fever").await.unwrap_err();

        assert!(matches!(err, AppError::UpstreamUnavailable(_)));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_unknown_symptom_keeps_sentinel() {
        let generator = FakeGenerator::new(Reply::Text("Could be many things."));
        let directory = DoctorDirectory::default();

        for _ in 0..3 {
            let response = analyze(&generator, &directory, "blurry vision").await.unwrap();
            assert!(response.ends_with(&format!("\n\n{NO_RECOMMENDATION}")));
        }
    }
}
