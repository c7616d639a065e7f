//! Prompt templates for the reasoning strategies

use crate::core::problem::{ImageRef, Problem};
use crate::core::strategy::StrategyId;
use crate::core::string::excerpt;
use crate::quorum::StrategyResult;

/// Reasoning excerpt length per analysis shown to the arbitrator
const SYNTHESIS_EXCERPT_LEN: usize = 500;

/// A fully built prompt for one backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Strategy persona
    pub system: String,
    /// Problem statement plus output contract
    pub text: String,
    /// Image forwarded alongside the text
    pub image: Option<ImageRef>,
}

/// Templates for building strategy-specific prompts
///
/// Prompt construction is a pure function of `(problem, strategy)`.
pub struct PromptTemplate;

impl PromptTemplate {
    /// Build the prompt a strategy sends for a problem
    pub fn build(problem: &Problem, strategy: &StrategyId) -> Prompt {
        Prompt {
            system: Self::persona(strategy),
            text: Self::problem_prompt(problem, strategy),
            image: problem.image().cloned(),
        }
    }

    /// Build the arbitrator prompt reviewing the `Ok` results for a problem.
    ///
    /// Each analysis contributes its strategy, answer, confidence and a
    /// reasoning excerpt. Results that are not `Ok` are left out.
    pub fn synthesis(problem: &Problem, results: &[StrategyResult]) -> Prompt {
        let mut text = String::from("EXPERT ANALYSES:\n\n");
        for result in results {
            let Some(answer) = result.answer.as_ref().filter(|_| result.is_ok()) else {
                continue;
            };
            text.push_str(&format!("{}\n{}:\n", "=".repeat(50), result.strategy.display_name()));
            text.push_str(&format!("Answer: {}\n", answer.display));
            match answer.confidence {
                Some(confidence) => text.push_str(&format!("Confidence: {}%\n", confidence)),
                None => text.push_str("Confidence: not stated\n"),
            }
            let reasoning = result.raw_text.as_deref().unwrap_or_default();
            text.push_str(&format!(
                "Key reasoning:\n{}\n\n",
                excerpt(reasoning, SYNTHESIS_EXCERPT_LEN)
            ));
        }

        if problem.image().is_some() {
            text.push_str("The problem statement is in the attached image.\n\n");
        }
        text.push_str(&format!("PROBLEM:\n{}\n\n", problem.text()));
        text.push_str(Self::output_contract(&StrategyId::Synthesis));

        Prompt {
            system: Self::persona(&StrategyId::Synthesis),
            text,
            image: problem.image().cloned(),
        }
    }

    /// System persona for a strategy
    pub fn persona(strategy: &StrategyId) -> String {
        match strategy {
            StrategyId::Systematic => r#"You are the SYSTEMATIC STRATEGY EXPERT for competitive-exam chemistry.

Your methodical approach:
1. List all molecules and options clearly
2. Identify ALL structural features (functional groups, stereochemistry, etc.)
3. Compare systematically across all options
4. Test each mechanistic possibility (SN1, SN2, E1, E2, NGP)
5. Eliminate wrong options with explicit reasoning
6. Double-check for trap patterns and edge cases
7. Verify your final answer"#
                .to_string(),
            StrategyId::KeyDifference => r#"You are the KEY DIFFERENCE EXPERT for competitive-exam chemistry.

Your mission: find THE ONE KEY DIFFERENCE that determines the answer.

Focus areas:
- Neighboring group participation and its rate enhancement
- Distance rule: NGP requires 2-3 atom separation
- Carbocation stability: 3° > 2° > 1°, quantified
- Rate law diagnostics: k[RX] versus k[RX][Nu]
- Leaving group ability: I⁻ > Br⁻ > Cl⁻ > F⁻

Be concise. Quantify everything. Find the decisive factor."#
                .to_string(),
            StrategyId::Mechanistic => r#"You are the ORBITAL AND MECHANISM EXPERT for competitive-exam chemistry.

Analysis framework:
- HOMO-LUMO interactions and orbital overlap
- Transition state geometry and energy (Hammond postulate)
- Resonance versus hyperconjugation, quantified
- Stereochemical outcome: inversion, retention, racemization
- Curved-arrow mechanism showing electron flow"#
                .to_string(),
            StrategyId::DevilsAdvocate => r#"You are the CRITICAL REVIEWER and TRAP DETECTOR for competitive-exam chemistry.

Your job: find flaws in the obvious reasoning and identify examiner tricks.

Check for:
- Overlooked NGP opportunities and distance miscalculations
- Rate law confusions (SN1 vs SN2 vs NGP)
- Stereochemistry errors
- Solvent effects (polar protic vs aprotic)
- Hidden structural features that change the mechanism

Be skeptical. Question every assumption, then commit to an answer."#
                .to_string(),
            StrategyId::Synthesis => r#"You are the FINAL ARBITRATOR synthesizing multiple expert analyses.

You receive analyses of one problem from specialized chemistry experts.

Your synthesis process:
1. Identify areas of agreement and disagreement
2. Evaluate the evidence behind each argument
3. Weight by stated confidence
4. Identify the strongest mechanistic reasoning
5. Check for hidden assumptions or overlooked factors
6. Decide, with a clear justification"#
                .to_string(),
            StrategyId::Custom(name) => format!(
                r#"You are a careful chemistry problem solver applying the "{}" strategy.
Reason step by step, check your work, and commit to a single final answer."#,
                name
            ),
        }
    }

    /// User prompt: problem statement, image note and output contract
    pub fn problem_prompt(problem: &Problem, strategy: &StrategyId) -> String {
        let mut prompt = String::from("Solve the following problem.\n\n");

        if problem.image().is_some() {
            prompt.push_str("The problem statement is in the attached image.\n\n");
        }

        prompt.push_str(&format!("PROBLEM:\n{}\n\n", problem.text()));
        prompt.push_str(Self::output_contract(strategy));
        prompt
    }

    /// Output format each strategy must follow.
    ///
    /// Every contract ends in `ANSWER:` and `CONFIDENCE:` lines so the answer
    /// parser can normalize all strategies the same way.
    pub fn output_contract(strategy: &StrategyId) -> &'static str {
        match strategy {
            StrategyId::Systematic => {
                r#"Output format:
Step 1: [Analysis]
Step 2: [Comparison]
...
Eliminated: [Which options and why]
ANSWER: (Letter or value)
CONFIDENCE: XX%"#
            }
            StrategyId::KeyDifference => {
                r#"Output format:
KEY DIFFERENCE: [The single factor that decides everything]
QUANTIFICATION: [How large the effect is and why]
ANSWER: (Letter or value)
CONFIDENCE: XX%"#
            }
            StrategyId::Mechanistic => {
                r#"Output format:
MECHANISM: [Mechanistic pathway]
ORBITAL ANALYSIS: [Key interactions]
STEREOCHEMISTRY: [Expected outcome]
ANSWER: (Letter or value)
CONFIDENCE: XX%"#
            }
            StrategyId::DevilsAdvocate => {
                r#"Output format:
POTENTIAL ERRORS IN REASONING: [What might be wrong]
EXAMINER TRICKS: [Trap patterns in this problem]
CORRECT ANALYSIS: [Your skeptical take]
ANSWER: (Letter or value)
CONFIDENCE: XX%"#
            }
            StrategyId::Synthesis => {
                r#"Output format:
AGENT SUMMARY: [Who said what]
AREAS OF DISAGREEMENT: [Conflicts]
DECIDING FACTOR: [What tipped the scale]
SYNTHESIS: [Best combined reasoning]
FINAL ANSWER: (Letter or value)
FINAL CONFIDENCE: XX%"#
            }
            StrategyId::Custom(_) => {
                r#"Output format:
Step 1: [Reasoning]
...
ANSWER: (Letter or value)
CONFIDENCE: XX%"#
            }
        }
    }
}
