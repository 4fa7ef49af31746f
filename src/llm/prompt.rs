//! Prompt text sent with every compliance question.
//!
//! The response format section of [`SYSTEM_INSTRUCTION`] is the contract that
//! [`crate::reply::parse_reply`] reads back; the markers must stay in sync.

pub(crate) const SYSTEM_INSTRUCTION: &str = r#"You are 'CompliGuard', an auditable, enterprise-grade compliance assistant.

CORE DIRECTIVE:
Answer the user's question using ONLY the provided Context.
Every claim must be backed by evidence from the Context.

RESPONSE FORMAT:
Format the response as the following sections, each introduced by its exact delimiter on its own line:

__ANSWER__
(A concise, direct answer to the question in 2-4 sentences.)

__CONFIDENCE__
(One word: High, Medium, or Low, depending on how directly the Context answers the question.)

__EVIDENCE__
(One citation per line in this format: Source Name | Page Number | Exact Excerpt)

__ACTION__
(A short recommended next step, e.g. "Submit request via HR Portal", "Review Policy", or "Escalate to InfoSec".)

RULES:
1. If the answer is not in the Context, the Answer must be "I cannot find this information in the current policy documents." and the Confidence must be "Low".
2. Do not invent information.
3. Excerpts must be quoted verbatim from the Context."#;

/// Sample knowledge base standing in for retrieved policy passages.
pub(crate) const KNOWLEDGE_BASE: &str = r"[SOURCE: Global_HR_Leave_Policy_v2.4.pdf | Page 3 | Section: Sick Leave]
Employees are entitled to 10 days of paid sick leave per calendar year. For any sick leave extending beyond 3 consecutive days, a medical certificate must be uploaded to the HR portal. For leave exceeding 7 days, the employee must contact the Leave Management Team (leave@company.com) to initiate a Short-Term Disability review.

[SOURCE: Remote_Work_Standard_2024.pdf | Page 4 | Section: Hybrid Model]
Employees are permitted to work remotely up to 3 days per week (Tue-Thu are core in-office days). Requests for full-time remote work must be approved by a VP-level executive and HR. Core working hours are 10:00 AM to 3:00 PM local time.

[SOURCE: InfoSec_Access_Control_ISO27001.docx | Page 12 | Section: Privileged Access]
Access to production databases is restricted to the DevOps engineering team (Group ID: devops-prod-access). All access must be logged via the PAM (Privileged Access Management) system. Access reviews must be conducted quarterly by the CISO. Temporary access for developers requires a ticket approved by the Engineering Manager.

[SOURCE: Travel_Expense_Policy_2024.pdf | Page 2 | Section: Meals & Entertainment]
The daily meal allowance for business travel is $75 per day. Alcohol is not reimbursable unless part of a client entertainment event, which requires pre-approval from a Director. Receipts are required for any expense over $25.

[SOURCE: Incident_Response_Playbook.pdf | Page 1 | Section: Severity Definition]
Severity 1 (Critical) incidents involve confirmed data breach, ransomware, or total system outage. SLA for initial response is 15 minutes. The Crisis Management Team must be activated immediately via PagerDuty.";

/// Builds the user content: the context block first, then the question.
pub(crate) fn build_prompt(query: &str) -> String {
    format!("CONTEXT:\n{KNOWLEDGE_BASE}\n\nUSER QUESTION:\n{query}\n")
}
