//! Prompt text for every model call the stages make.

use studio_core::Mode;

pub fn intent(question: &str) -> String {
    format!(
        "Classify the intent of a question asked to a document assistant.\n\
         Answer with exactly one label: code, news, or general.\n\n\
         Question: {question}\n\n\
         Label:"
    )
}

pub fn code_context(question: &str) -> String {
    format!(
        "The user is asking about code or a technical concept in their documents.\n\
         Describe in three short bullets what they most likely need.\n\n\
         Question:\n{question}"
    )
}

pub fn video_precontext(question: &str) -> String {
    format!(
        "You are preparing to answer a question about a recorded lecture.\n\n\
         Question:\n{question}\n\n\
         Reply with three bullets:\n\
         1. Which part of the video likely holds the answer\n\
         2. What kind of reasoning the answer needs\n\
         3. What to look for in the transcript"
    )
}

pub fn video_chapters(transcript: &str) -> String {
    format!(
        "Below is part of a lecture transcript.\n\n\
         {transcript}\n\n\
         Write 5 to 8 short chapter titles, one per line, each starting with a timestamp:\n\
         [0m00s] Introduction\n\
         [5m10s] Main concept"
    )
}

pub fn video_agent(question: &str, transcript: &str) -> String {
    format!(
        "You answer questions about a video using its transcript. Tools are available for \
         searching the transcript, looking up timestamps, summarizing, and finding sections.\n\n\
         Transcript excerpts:\n{transcript}\n\n\
         Question: {question}\n\n\
         Cite timestamps like [5m30s] where they support the answer."
    )
}

pub fn video_direct(question: &str, transcript: &str) -> String {
    format!(
        "Answer the question using only this video transcript.\n\n\
         Transcript excerpts:\n{transcript}\n\n\
         Question: {question}\n\n\
         Cite timestamps like [5m30s] where they support the answer. If the transcript does \
         not cover the question, say so."
    )
}

pub fn docs_agent(question: &str, memory: &str, tool_context: &str, docs: &str) -> String {
    format!(
        "You answer questions from the user's documents. Use the excerpts first; call tools \
         for more document passages, encyclopedia lookups, or code explanations.\n\n\
         User memory:\n{memory}\n\n\
         Notes:\n{tool_context}\n\n\
         Document excerpts:\n{docs}\n\n\
         Question: {question}"
    )
}

pub fn docs_direct(question: &str, memory: &str, tool_context: &str, docs: &str) -> String {
    format!(
        "Answer the question using only the document excerpts below. If they do not contain \
         the answer, say so.\n\n\
         User memory:\n{memory}\n\n\
         Notes:\n{tool_context}\n\n\
         Document excerpts:\n{docs}\n\n\
         Question: {question}"
    )
}

const BLUEPRINT_SECTIONS: &str = "Sections:\n\
    1. Problem and target users\n\
    2. User personas\n\
    3. Core MVP features, prioritized\n\
    4. System architecture\n\
    5. Recommended tech stack\n\
    6. Competitive landscape\n\
    7. Risks and next steps";

pub fn product_agent(idea: &str, memory: &str) -> String {
    format!(
        "You are a product manager and system architect. Use the available tools to draft \
         features, personas, architecture, competitors, and a tech stack, then combine them.\n\n\
         Earlier product work:\n{memory}\n\n\
         Idea:\n{idea}\n\n\
         {BLUEPRINT_SECTIONS}\n\n\
         Write the MVP blueprint in Markdown."
    )
}

pub fn product_direct(idea: &str, memory: &str) -> String {
    format!(
        "You are a product manager and system architect.\n\n\
         Earlier product work:\n{memory}\n\n\
         Idea:\n{idea}\n\n\
         {BLUEPRINT_SECTIONS}\n\n\
         Write the MVP blueprint in Markdown."
    )
}

pub fn research_plan(question: &str) -> String {
    format!(
        "You plan web research.\n\n\
         Question:\n{question}\n\n\
         In 5 to 7 bullets cover: the data points needed, the kinds of sites likely to have \
         them, two or three search queries, and how the final answer should be laid out."
    )
}

pub const RESEARCH_SYSTEM: &str = "You are a web research assistant.\n\
    1. Call web_search once to find relevant pages.\n\
    2. Call web_scrape on at most two of the best URLs.\n\
    3. Use price_extractor on scraped text when prices matter.\n\
    4. Then stop and answer with bullets or a table.\n\
    If nothing useful turns up, say so and answer from what you know.";

pub fn research_agent(question: &str) -> String {
    format!(
        "Research this question and answer it:\n\n{question}\n\n\
         Search once, scrape one or two pages, then answer."
    )
}

pub fn research_direct(question: &str, plan: &str) -> String {
    format!(
        "You are a research assistant. Live web access is unavailable, so answer from what \
         you already know and say so.\n\n\
         Question:\n{question}\n\n\
         Research plan:\n{plan}\n\n\
         Give a summary, the key points or comparisons, a recommendation where it fits, and a \
         reminder to check current prices and availability online."
    )
}

pub fn writer(mode: &Mode, intermediate: &str, memory: &str) -> String {
    format!(
        "You write the final reply of an assistant.\n\n\
         Mode: {mode}\n\n\
         Draft answer:\n{intermediate}\n\n\
         What we know about the user:\n{memory}\n\n\
         1. Clean up the draft and keep its Markdown.\n\
         2. End with a one-line summary starting with 'TL;DR:'.\n\
         3. Suggest one short fact worth remembering about the user (goals, preferences, \
         projects), or \"\" if there is none.\n\n\
         Reply with JSON only:\n\
         {{\"answer\": \"...\", \"memory_to_save\": \"...\"}}"
    )
}

// ── Tool prompts ───────────────────────────────────────────────

pub fn explain_code(code: &str) -> String {
    format!(
        "Explain this code: what it does, how it works, and anything notable about it.\n\n\
         ```\n{code}\n```"
    )
}

pub fn summarize_transcript(focus: &str, transcript: &str) -> String {
    format!(
        "Summarize these transcript excerpts in 5 to 8 bullets, focusing on: {focus}\n\n\
         {transcript}"
    )
}

pub fn features(idea: &str) -> String {
    format!(
        "List the core MVP features for this product idea, grouped as must-have, \
         should-have, and later, one line each.\n\nIdea: {idea}"
    )
}

pub fn personas(idea: &str) -> String {
    format!(
        "Describe 2 or 3 user personas for this product: who they are, their goals, and \
         their pain points.\n\nIdea: {idea}"
    )
}

pub fn architecture(idea: &str) -> String {
    format!(
        "Outline a system architecture for this product's MVP: components, data flow, \
         storage, and external services.\n\nIdea: {idea}"
    )
}

pub fn competitors(idea: &str) -> String {
    format!(
        "Name likely competitors or alternatives for this product and how an MVP could \
         stand apart.\n\nIdea: {idea}"
    )
}

pub fn tech_stack(idea: &str) -> String {
    format!(
        "Recommend a pragmatic tech stack for this product's MVP (frontend, backend, data, \
         hosting) with a one-line reason for each.\n\nIdea: {idea}"
    )
}
