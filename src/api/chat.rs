use std::sync::Arc;

use async_graphql::{Context, Object, Result};
use tokio::sync::Mutex;

use crate::{
    llm::ModelClient,
    session::{self, ChatSession, Message},
};

#[derive(Default)]
pub(super) struct ChatQuery;

#[Object]
impl ChatQuery {
    /// The conversation so far, oldest first, starting with the greeting.
    async fn chat_messages(&self, ctx: &Context<'_>) -> Result<Vec<Message>> {
        let session = ctx.data::<Arc<Mutex<ChatSession>>>()?;
        Ok(session.lock().await.messages().to_vec())
    }

    /// Whether a question is waiting on the model.
    async fn chat_pending(&self, ctx: &Context<'_>) -> Result<bool> {
        let session = ctx.data::<Arc<Mutex<ChatSession>>>()?;
        Ok(session.lock().await.is_pending())
    }
}

#[derive(Default)]
pub(super) struct ChatMutation;

#[Object]
impl ChatMutation {
    /// Asks the compliance assistant and returns its reply message.
    async fn ask(&self, ctx: &Context<'_>, query: String) -> Result<Message> {
        let session = ctx.data::<Arc<Mutex<ChatSession>>>()?;
        let client = ctx.data::<Arc<dyn ModelClient>>()?;
        Ok(session::ask(session, client.as_ref(), &query).await?)
    }

    /// Resets the conversation to the greeting. Fails while a question is
    /// waiting on the model.
    async fn clear_chat(&self, ctx: &Context<'_>) -> Result<bool> {
        let session = ctx.data::<Arc<Mutex<ChatSession>>>()?;
        session.lock().await.clear()?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::{api::TestSchema, llm::RequestError, session::tests::FakeModel};

    fn leave_reply() -> Result<String, RequestError> {
        Ok("__ANSWER__\nYou get 10 days.\n__CONFIDENCE__\nHigh\n__EVIDENCE__\n\
            Global_HR_Leave_Policy_v2.4.pdf | Page 3 | 10 days of paid sick leave\n\
            __ACTION__\nSubmit via the HR Portal."
            .to_string())
    }

    #[tokio::test]
    async fn greeting_is_first_message() {
        let schema = TestSchema::new();
        let query = r"
        {
            chatMessages {
                role
                reply { confidence }
            }
            chatPending
        }";
        let data = schema.execute(query).await.data.into_json().unwrap();
        assert_eq!(data["chatMessages"][0]["role"], "SYSTEM");
        assert_eq!(data["chatMessages"][0]["reply"]["confidence"], "HIGH");
        assert_eq!(data["chatPending"], false);
    }

    #[tokio::test]
    async fn ask_returns_structured_reply() {
        let schema = TestSchema::with_model(FakeModel::replying(leave_reply));
        let query = r#"
        mutation {
            ask(query: "How many sick days do I get?") {
                role
                reply {
                    answer
                    confidence
                    citations { source page excerpt }
                    suggestedAction
                }
            }
        }"#;
        let data = schema.execute(query).await.data.into_json().unwrap();
        let reply = &data["ask"]["reply"];
        assert_eq!(data["ask"]["role"], "ASSISTANT");
        assert_eq!(reply["answer"], "You get 10 days.");
        assert_eq!(reply["confidence"], "HIGH");
        assert_eq!(reply["citations"][0]["source"], "Global_HR_Leave_Policy_v2.4.pdf");
        assert_eq!(reply["citations"][0]["page"], "Page 3");
        assert_eq!(reply["suggestedAction"], "Submit via the HR Portal.");

        let data = schema
            .execute("{ chatMessages { role content } }")
            .await
            .data
            .into_json()
            .unwrap();
        let messages = data["chatMessages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1]["content"], "How many sick days do I get?");
    }

    #[tokio::test]
    async fn blank_question_is_an_error() {
        let schema = TestSchema::new();
        let res = schema.execute(r#"mutation { ask(query: "   ") { id } }"#).await;
        assert_eq!(res.errors.len(), 1);
        assert_eq!(res.errors[0].message, "query must not be empty");
    }

    #[tokio::test]
    async fn missing_key_becomes_assistant_notice() {
        let schema =
            TestSchema::with_model(FakeModel::replying(|| Err(RequestError::Configuration)));
        let res = schema
            .execute(r#"mutation { ask(query: "Is MFA required?") { content reply { answer } } }"#)
            .await;
        assert!(res.errors.is_empty());
        let data = res.data.into_json().unwrap();
        assert!(data["ask"]["content"]
            .as_str()
            .unwrap()
            .contains("check your API key"));
        assert!(data["ask"]["reply"].is_null());
    }

    #[tokio::test]
    async fn clear_chat_keeps_greeting() {
        let schema = TestSchema::with_model(FakeModel::replying(leave_reply));
        schema
            .execute(r#"mutation { ask(query: "sick leave") { id } }"#)
            .await;
        let data = schema
            .execute("mutation { clearChat }")
            .await
            .data
            .into_json()
            .unwrap();
        assert_eq!(data["clearChat"], true);

        let data = schema
            .execute("{ chatMessages { role } }")
            .await
            .data
            .into_json()
            .unwrap();
        assert_eq!(data["chatMessages"].as_array().unwrap().len(), 1);
    }
}
