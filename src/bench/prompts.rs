//! Japanese benchmark prompt sets.

use serde::{Deserialize, Serialize};

/// What a prompt exercises; selects the kind-specific quality rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Short essay
    CreativeWriting,
    /// Multi-step arithmetic word problem
    MathReasoning,
    /// Spot a flaw in an argument
    LogicalReasoning,
    /// Write a function
    CodeGeneration,
    /// Explain a well-known fact
    FactualKnowledge,
    /// Japanese to English
    Translation,
    /// Condense a paragraph
    Summarization,
    /// Answer in character
    Roleplay,
    /// Small talk
    Greeting,
    /// Bare arithmetic
    SimpleMath,
    /// One or two sentences
    ShortWriting,
    /// Explain a phenomenon
    Explanation,
}

impl PromptKind {
    /// Answers are expected to contain digits or operators
    pub fn is_math(self) -> bool {
        matches!(self, Self::MathReasoning)
    }
}

/// One benchmark question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BenchPrompt {
    /// Reporting category
    pub category: &'static str,
    /// Prompt text
    pub question: &'static str,
    /// Scoring kind
    pub kind: PromptKind,
}

const fn prompt(category: &'static str, question: &'static str, kind: PromptKind) -> BenchPrompt {
    BenchPrompt {
        category,
        question,
        kind,
    }
}

/// Eight-category Japanese MT-Bench style set.
pub const MT_BENCH_JAPANESE: &[BenchPrompt] = &[
    prompt(
        "Writing",
        "「人工知能が私たちの日常生活を変える」というテーマで、200文字程度の短いエッセイを書いてください。",
        PromptKind::CreativeWriting,
    ),
    prompt(
        "Math",
        "太郎君は100円のお菓子を3個と、150円のジュースを2本買いました。500円札で支払った場合、おつりはいくらですか？計算過程も示してください。",
        PromptKind::MathReasoning,
    ),
    prompt(
        "Reasoning",
        "次の文章の論理的な問題点を指摘してください：「すべての鳥は飛べる。ペンギンは鳥である。したがって、ペンギンは飛べる。」",
        PromptKind::LogicalReasoning,
    ),
    prompt(
        "Coding",
        "Pythonで、リストの中から重複する要素を削除する関数を書いてください。",
        PromptKind::CodeGeneration,
    ),
    prompt(
        "Knowledge",
        "富士山について、高さ、場所、文化的意義を含めて説明してください。",
        PromptKind::FactualKnowledge,
    ),
    prompt(
        "Translation",
        "次の文を英語に翻訳してください：「昨日、友達と一緒に新しいラーメン屋に行きました。とても美味しかったです。」",
        PromptKind::Translation,
    ),
    prompt(
        "Summarization",
        "AIの発展により、多くの仕事が自動化される可能性があります。これには良い面と悪い面があり、新しい仕事が生まれる一方で、従来の仕事がなくなる可能性もあります。この文章を30文字以内で要約してください。",
        PromptKind::Summarization,
    ),
    prompt(
        "Role-play",
        "あなたは親切な店員です。お客様から「この商品の使い方がわからない」と言われました。どのように対応しますか？",
        PromptKind::Roleplay,
    ),
];

/// Five short prompts for a quick Japanese capability pass.
pub const QUICK_JAPANESE: &[BenchPrompt] = &[
    prompt("General", "こんにちは。今日はいい天気ですね。", PromptKind::Greeting),
    prompt("Math", "100 + 200 = ?", PromptKind::SimpleMath),
    prompt("Writing", "桜について50文字で説明してください。", PromptKind::ShortWriting),
    prompt("Translation", "「ありがとう」を英語に翻訳してください。", PromptKind::Translation),
    prompt("Reasoning", "なぜ空は青いのですか？簡単に説明してください。", PromptKind::Explanation),
];
