/// One row of the analysis table: a stable key, the title shown to the
/// reader, and the instruction sent as the system message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisStep {
    pub key: &'static str,
    pub title: &'static str,
    pub instruction: &'static str,
}

/// The ten analysis sections, in the order they are requested and presented.
pub const ANALYSIS_STEPS: [AnalysisStep; 10] = [
    AnalysisStep {
        key: "summary",
        title: "Article Summary",
        instruction: "Write a detailed summary of the scientific article, highlighting its most important points.",
    },
    AnalysisStep {
        key: "theoretical_basis",
        title: "Theoretical Basis",
        instruction: "What theoretical foundations does this research article build on?",
    },
    AnalysisStep {
        key: "methodology",
        title: "Methodology",
        instruction: "What methodology does this research article use? Describe the methods in detail.",
    },
    AnalysisStep {
        key: "key_concepts",
        title: "Key Concepts",
        instruction: "What are the key concepts the article deals with? List them and briefly explain each one.",
    },
    AnalysisStep {
        key: "objectives",
        title: "Research Objectives",
        instruction: "What are the main objectives of the research presented in the article?",
    },
    AnalysisStep {
        key: "results",
        title: "Main Results",
        instruction: "What are the main results and findings presented in the article?",
    },
    AnalysisStep {
        key: "critical_evaluation",
        title: "Critical Evaluation",
        instruction: "Critically evaluate the methods and results presented. What are their strengths and weaknesses?",
    },
    AnalysisStep {
        key: "literature_context",
        title: "Literature Context",
        instruction: "How does this article fit into the existing scientific literature? What novel contributions does it make?",
    },
    AnalysisStep {
        key: "implications",
        title: "Implications and Future Directions",
        instruction: "What are the implications of these findings, and which future lines of research does the article suggest?",
    },
    AnalysisStep {
        key: "conclusions",
        title: "Conclusions",
        instruction: "Summarize the article's main conclusions and their scientific relevance.",
    },
];
