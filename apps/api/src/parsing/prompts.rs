// Prompt templates for LLM-backed parsing. Placeholders are replaced with
// `str::replace` before sending.

/// Replace `{candidate_id}` and `{resume_text}`.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Extract structured information from the resume below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "candidate_id": "{candidate_id}",
  "name": "Full Name",
  "skills": ["Rust", "PostgreSQL"],
  "experience": [
    {
      "company": "Company name",
      "position": "Job title",
      "start_date": "2019-06",
      "end_date": "Present",
      "description": "What the candidate did"
    }
  ],
  "education": [
    {"institution": "University", "degree": "BSc", "field": "Computer Science", "year": 2018}
  ],
  "raw_text": ""
}

Rules:
- Keep "candidate_id" exactly as given.
- Leave "raw_text" empty; it is filled in afterwards.
- List experience most recent first.

{no_fabrication}

RESUME:
{resume_text}"#;

/// Replace `{jd_id}` and `{jd_text}`.
pub const JD_PARSE_PROMPT_TEMPLATE: &str = r#"Extract structured information from the job description below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "jd_id": "{jd_id}",
  "title": "Senior Backend Engineer",
  "must_have_requirements": ["5+ years Rust", "PostgreSQL"],
  "nice_to_have": ["Kubernetes"],
  "description": "One-paragraph summary of the role",
  "experience_years_required": 5,
  "raw_text": ""
}

Rules:
- Keep "jd_id" exactly as given.
- Must-haves are explicit requirements ("required", "must have", minimum years).
- Nice-to-haves are phrased as "preferred", "bonus", "plus" or "nice to have".
- "experience_years_required" is an integer; use 0 when not stated.
- Leave "raw_text" empty; it is filled in afterwards.

{no_fabrication}

JOB DESCRIPTION:
{jd_text}"#;
