pub trait FeedbackPublisher {
    fn publish(&self, topic_arn: &str, message: &str) -> Result<(), String>;
}
