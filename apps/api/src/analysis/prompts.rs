// Prompts for candidate analysis against a job description.

pub const SCORING_SYSTEM: &str = "You are an expert technical recruiter. \
    You compare candidate resumes against job descriptions and judge fit honestly. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Replace: {job_description}, {must_have_requirements}, {candidate_name},
///          {candidate_skills}, {resume_text}
pub const SCORING_PROMPT_TEMPLATE: &str = r#"Analyze the candidate below against the job description.

JOB DESCRIPTION:
{job_description}

MUST-HAVE REQUIREMENTS:
{must_have_requirements}

CANDIDATE NAME: {candidate_name}
CANDIDATE SKILLS: {candidate_skills}

CANDIDATE RESUME:
{resume_text}

Return a JSON object with this EXACT schema:
{
  "overall_score": 0-100,
  "similarity_score": 0-100,
  "must_have_matches": ["requirement text the candidate satisfies"],
  "reason_codes": ["SKILL_MATCH: Rust, PostgreSQL", "MISSING_REQUIREMENT: Kafka"],
  "matched_sections": {
    "requirement text": "resume section reference, e.g. Experience > Acme > Backend Engineer"
  }
}

Rules:
- "similarity_score" measures how closely the candidate's background fits the role as a whole.
- Only list a must-have in "must_have_matches" when the resume shows clear evidence for it.
- Reason codes use the prefixes SKILL_MATCH, EXPERIENCE_MATCH, MUST_HAVE_MATCH, RECENT_EXP,
  EDUCATION_MATCH or MISSING_REQUIREMENT."#;
