//! # Conversation Driver

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    WLError, WLResult,
    generation::{
        ConversationLog, ConversationTurn, Evaluation, Evaluator, GenerationOptions, HiddenState,
        Logits, TurnTemplate,
    },
    sampling::sample,
    tokenizer::Tokenizer,
    types::{TokenType, try_token_from_usize},
};

/// Why a generation ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The token callback asked to stop.
    Cancelled,

    /// The response contained the stop string.
    StopString,
}

/// The driver's lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationStatus {
    /// No hidden state; generation is not possible.
    Idle,

    /// Input has been consumed; next-token logits are available.
    Primed,

    /// A response is being generated.
    Generating,

    /// The last response ended early.
    Stopped(StopReason),

    /// The last response used every allowed token.
    Exhausted,
}

/// Drives a conversation with an external [`Evaluator`].
///
/// Owns the hidden state and the current logits; the tokenizer is shared.
/// Evaluation is strictly sequential: each step consumes the state
/// produced by the previous one.
#[derive(Debug)]
pub struct Conversation<T, E, R = StdRng>
where
    T: TokenType,
    E: Evaluator<T>,
    R: Rng,
{
    tokenizer: Tokenizer<T>,
    evaluator: E,
    rng: R,
    state: Option<HiddenState>,
    logits: Option<Logits>,
    status: ConversationStatus,
}

impl<T, E> Conversation<T, E, StdRng>
where
    T: TokenType,
    E: Evaluator<T>,
{
    /// Create a driver with an OS-seeded random source.
    pub fn new(
        tokenizer: Tokenizer<T>,
        evaluator: E,
    ) -> Self {
        Self::with_rng(tokenizer, evaluator, StdRng::from_os_rng())
    }

    /// Create a driver with a seeded random source.
    pub fn with_seed(
        tokenizer: Tokenizer<T>,
        evaluator: E,
        seed: u64,
    ) -> Self {
        Self::with_rng(tokenizer, evaluator, StdRng::seed_from_u64(seed))
    }
}

impl<T, E, R> Conversation<T, E, R>
where
    T: TokenType,
    E: Evaluator<T>,
    R: Rng,
{
    /// Create a driver with the given random source.
    pub fn with_rng(
        tokenizer: Tokenizer<T>,
        evaluator: E,
        rng: R,
    ) -> Self {
        Self {
            tokenizer,
            evaluator,
            rng,
            state: None,
            logits: None,
            status: ConversationStatus::Idle,
        }
    }

    /// The current lifecycle state.
    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    /// The tokenizer.
    pub fn tokenizer(&self) -> &Tokenizer<T> {
        &self.tokenizer
    }

    /// The evaluator.
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// The current hidden state, if any.
    pub fn hidden_state(&self) -> Option<&HiddenState> {
        self.state.as_ref()
    }

    /// The current next-token logits, if any.
    pub fn logits(&self) -> Option<&[f32]> {
        self.logits.as_deref()
    }

    /// Discard the hidden state and logits, returning to
    /// [`ConversationStatus::Idle`].
    pub fn reset(&mut self) {
        self.state = None;
        self.logits = None;
        self.status = ConversationStatus::Idle;
    }

    /// Feed text through the model.
    ///
    /// Every token is evaluated in order, threading the hidden state.
    /// The new state is committed only once the whole input has been
    /// consumed; on error the driver is left as it was.
    /// Input that encodes to no tokens changes nothing.
    ///
    /// ## Returns
    /// The number of tokens consumed.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, text)))]
    pub fn process_input(
        &mut self,
        text: &str,
    ) -> WLResult<usize> {
        let tokens = self.tokenizer.encode_ids(text)?;
        log::debug!("Processing {} input tokens", tokens.len());

        let mut last: Option<Evaluation> = None;
        for &token in &tokens {
            let prior = last.as_ref().map(|e| &e.state).or(self.state.as_ref());
            last = Some(self.evaluator.evaluate(token, prior)?);
        }

        if let Some(Evaluation { state, logits }) = last {
            self.state = Some(state);
            self.logits = Some(logits);
            self.status = ConversationStatus::Primed;
        }
        Ok(tokens.len())
    }

    /// Generate a response from the current logits.
    ///
    /// Each step samples a token, evaluates it, decodes it, appends it
    /// to the response, and passes the fragment to `on_token`.
    /// Generation stops when `on_token` returns `false`, when the
    /// response contains the stop string (the response is truncated
    /// before it), or after `max_tokens` steps.
    ///
    /// ## Arguments
    /// * `options` - the token cap, stop string and sampler.
    /// * `on_token` - receives each decoded fragment; return `false` to stop.
    ///
    /// ## Returns
    /// The response text.
    ///
    /// ## Errors
    /// * [`WLError::Usage`] when called before any input was processed.
    /// * [`WLError::InvalidParameter`] for bad sampler options.
    /// * [`WLError::Evaluation`] from the evaluator; tokens consumed
    ///   before the failure stay consumed.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip(self, options, on_token))
    )]
    pub fn generate_response<F>(
        &mut self,
        options: &GenerationOptions,
        on_token: F,
    ) -> WLResult<String>
    where
        F: FnMut(&str) -> bool,
    {
        if self.logits.is_none() {
            return Err(WLError::Usage(
                "generate_response called before process_input".to_string(),
            ));
        }
        options.validate()?;

        self.status = ConversationStatus::Generating;
        let mut response = String::new();
        match self.generate_into(options, on_token, &mut response) {
            Ok((status, steps)) => {
                self.status = status;
                log::info!("Generation ended: {status:?} after {steps} tokens");
                Ok(response)
            }
            Err(err) => {
                self.status = ConversationStatus::Primed;
                Err(err)
            }
        }
    }

    fn generate_into<F>(
        &mut self,
        options: &GenerationOptions,
        mut on_token: F,
        response: &mut String,
    ) -> WLResult<(ConversationStatus, usize)>
    where
        F: FnMut(&str) -> bool,
    {
        let stop = options.active_stop_string();

        for step in 1..=options.max_tokens() {
            let logits = self
                .logits
                .as_deref()
                .ok_or_else(|| WLError::Usage("no logits to sample from".to_string()))?;
            let index = sample(logits, options.sampler(), &mut self.rng)?;
            let token: T = try_token_from_usize(index)?;

            let Evaluation { state, logits } = self.evaluator.evaluate(token, self.state.as_ref())?;
            self.state = Some(state);
            self.logits = Some(logits);

            let fragment = self.tokenizer.decode_token(token);
            log::trace!("Sampled token {token}: {fragment:?}");
            response.push_str(&fragment);

            let keep_going = on_token(&fragment);

            let stopped = match stop {
                Some(stop) => find_stop(response, fragment.len(), stop),
                None => None,
            };
            if let Some(pos) = stopped {
                response.truncate(pos);
            }

            if !keep_going {
                return Ok((ConversationStatus::Stopped(StopReason::Cancelled), step));
            }
            if stopped.is_some() {
                return Ok((ConversationStatus::Stopped(StopReason::StopString), step));
            }
        }
        Ok((ConversationStatus::Exhausted, options.max_tokens()))
    }

    /// Feed every logged turn through [`Self::process_input`].
    ///
    /// ## Returns
    /// The number of tokens consumed.
    pub fn replay(
        &mut self,
        log: &ConversationLog,
        template: &TurnTemplate,
    ) -> WLResult<usize> {
        let mut consumed = 0;
        for turn in log.turns() {
            consumed += self.process_input(&template.render_turn(turn))?;
        }
        log::debug!("Replayed {} turns ({consumed} tokens)", log.len());
        Ok(consumed)
    }

    /// Perform one exchange: prompt with `user_text`, then generate.
    ///
    /// ## Returns
    /// The completed turn; append it to a [`ConversationLog`] to persist it.
    pub fn chat<F>(
        &mut self,
        user_text: &str,
        template: &TurnTemplate,
        options: &GenerationOptions,
        on_token: F,
    ) -> WLResult<ConversationTurn>
    where
        F: FnMut(&str) -> bool,
    {
        self.process_input(&template.render_prompt(user_text))?;
        let response = self.generate_response(options, on_token)?;
        Ok(ConversationTurn::new(user_text, response))
    }
}

/// Find the first occurrence of `stop` which overlaps the last `appended` bytes.
///
/// Earlier text was already searched.
fn find_stop(
    response: &str,
    appended: usize,
    stop: &str,
) -> Option<usize> {
    let mut start = response.len().saturating_sub(appended + stop.len());
    while !response.is_char_boundary(start) {
        start -= 1;
    }
    response[start..].find(stop).map(|pos| start + pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        generation::FnEvaluator,
        sampling::SamplerOptions,
        testing::{ScriptedEvaluator, letters_token, letters_tokenizer, static_is_send_sync_check},
    };

    fn scripted(words: &[&str]) -> Conversation<u32, ScriptedEvaluator> {
        let tokenizer = letters_tokenizer();
        let script: Vec<u32> = words.iter().map(|w| letters_token(&tokenizer, w)).collect();
        let evaluator = ScriptedEvaluator::new(tokenizer.vocab().len()).with_script(&script);
        Conversation::with_seed(tokenizer, evaluator, 0)
    }

    fn greedy() -> GenerationOptions {
        GenerationOptions::default().with_sampler(SamplerOptions::greedy())
    }

    #[test]
    fn test_generate_from_idle_is_usage_error() {
        let mut conv = scripted(&[" hello"]);
        assert_eq!(conv.status(), ConversationStatus::Idle);

        let mut called = false;
        let result = conv.generate_response(&greedy(), |_| {
            called = true;
            true
        });
        assert!(matches!(result, Err(WLError::Usage(_))));
        assert!(!called);
        assert_eq!(conv.status(), ConversationStatus::Idle);
    }

    #[test]
    fn test_process_input_threads_state() {
        let mut conv = scripted(&[" hello"]);
        assert_eq!(conv.process_input("hi hello").unwrap(), 3);
        assert_eq!(conv.status(), ConversationStatus::Primed);

        // State is [steps, last token].
        let hello = letters_token(conv.tokenizer(), " hello");
        assert_eq!(
            conv.hidden_state().unwrap().as_slice(),
            &[3.0, hello as f32]
        );
        assert_eq!(conv.evaluator().history(), vec![40, 28, hello]);

        conv.process_input("hi").unwrap();
        assert_eq!(conv.hidden_state().unwrap().as_slice()[0], 4.0);
    }

    #[test]
    fn test_empty_input_is_noop() {
        let mut conv = scripted(&[" hello"]);
        assert_eq!(conv.process_input("").unwrap(), 0);
        assert_eq!(conv.status(), ConversationStatus::Idle);
        assert!(conv.logits().is_none());
    }

    #[test]
    fn test_stop_string_truncates() {
        let mut conv = scripted(&[" hello", " world", "\n", " hi"]);
        conv.process_input("hi").unwrap();

        let mut streamed = Vec::new();
        let response = conv
            .generate_response(&greedy().with_stop_string("\n"), |s| {
                streamed.push(s.to_string());
                true
            })
            .unwrap();

        assert_eq!(response, " hello world");
        assert_eq!(streamed, vec![" hello", " world", "\n"]);
        assert_eq!(
            conv.status(),
            ConversationStatus::Stopped(StopReason::StopString)
        );
    }

    #[test]
    fn test_stop_string_across_fragments() {
        let mut conv = scripted(&[" hello", " world", " hi"]);
        conv.process_input("a").unwrap();

        let response = conv
            .generate_response(&greedy().with_stop_string("o w"), |_| true)
            .unwrap();
        assert_eq!(response, " hell");
    }

    #[test]
    fn test_cancel() {
        let mut conv = scripted(&[" hello", " world", " hi"]);
        conv.process_input("a").unwrap();

        let mut count = 0;
        let response = conv
            .generate_response(&greedy(), |_| {
                count += 1;
                count < 2
            })
            .unwrap();
        assert_eq!(response, " hello world");
        assert_eq!(
            conv.status(),
            ConversationStatus::Stopped(StopReason::Cancelled)
        );
    }

    #[test]
    fn test_cancel_on_stop_fragment_still_truncates() {
        let mut conv = scripted(&[" hello", "\n", " hi"]);
        conv.process_input("a").unwrap();

        let response = conv
            .generate_response(&greedy().with_stop_string("\n"), |s| s != "\n")
            .unwrap();
        assert_eq!(response, " hello");
        assert_eq!(
            conv.status(),
            ConversationStatus::Stopped(StopReason::Cancelled)
        );
    }

    #[test]
    fn test_exhausted() {
        let mut conv = scripted(&[" hi", " hi"]);
        conv.process_input("a").unwrap();

        let response = conv
            .generate_response(&greedy().with_max_tokens(3), |_| true)
            .unwrap();
        assert_eq!(response, " hi hi hi");
        assert_eq!(conv.status(), ConversationStatus::Exhausted);

        // Generation may continue from the current logits.
        let response = conv
            .generate_response(&greedy().with_max_tokens(0), |_| true)
            .unwrap();
        assert_eq!(response, "");
        assert_eq!(conv.status(), ConversationStatus::Exhausted);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let mut conv = scripted(&[" hi"]);
        conv.process_input("a").unwrap();
        let before = conv.hidden_state().cloned();

        let options = GenerationOptions::default()
            .with_sampler(SamplerOptions::default().with_top_p(2.0));
        assert!(matches!(
            conv.generate_response(&options, |_| true),
            Err(WLError::InvalidParameter(_))
        ));
        assert_eq!(conv.hidden_state().cloned(), before);
        assert_eq!(conv.status(), ConversationStatus::Primed);
    }

    #[test]
    fn test_evaluation_error_during_input_keeps_state() {
        let tokenizer = letters_tokenizer();
        let fail = letters_token(&tokenizer, "z");
        let evaluator = ScriptedEvaluator::new(tokenizer.vocab().len()).with_fail_on(fail);
        let mut conv = Conversation::with_seed(tokenizer, evaluator, 0);

        conv.process_input("hi").unwrap();
        let before = conv.hidden_state().cloned();

        assert!(matches!(
            conv.process_input("haz"),
            Err(WLError::Evaluation(_))
        ));
        assert_eq!(conv.hidden_state().cloned(), before);
        assert_eq!(conv.status(), ConversationStatus::Primed);
    }

    #[test]
    fn test_evaluation_error_during_generation() {
        let tokenizer = letters_tokenizer();
        let hi = letters_token(&tokenizer, " hi");
        let evaluator = ScriptedEvaluator::new(tokenizer.vocab().len())
            .with_script(&[hi])
            .with_fail_on(hi);
        let mut conv = Conversation::with_seed(tokenizer, evaluator, 0);
        conv.process_input("a").unwrap();

        assert!(matches!(
            conv.generate_response(&greedy(), |_| true),
            Err(WLError::Evaluation(_))
        ));
        assert_eq!(conv.status(), ConversationStatus::Primed);
    }

    #[test]
    fn test_reset() {
        let mut conv = scripted(&[" hi"]);
        conv.process_input("a").unwrap();
        conv.reset();

        assert_eq!(conv.status(), ConversationStatus::Idle);
        assert!(conv.hidden_state().is_none());
        assert!(matches!(
            conv.generate_response(&greedy(), |_| true),
            Err(WLError::Usage(_))
        ));
    }

    #[test]
    fn test_chat_and_replay() {
        let mut conv = scripted(&[" hello", " world", "\n"]);
        let template = TurnTemplate::default();
        let options = greedy().with_stop_string("\n");

        let turn = conv.chat("hi", &template, &options, |_| true).unwrap();
        assert_eq!(turn, ConversationTurn::new("hi", " hello world"));

        let mut log = ConversationLog::new();
        log.push_turn(turn);

        let mut fresh = scripted(&[" hello"]);
        let consumed = fresh.replay(&log, &template).unwrap();
        let expected = fresh
            .tokenizer()
            .encode_ids(&template.render_turn(&log.turns()[0]))
            .unwrap()
            .len();
        assert_eq!(consumed, expected);
        assert_eq!(fresh.status(), ConversationStatus::Primed);
    }

    #[test]
    fn test_sampled_generation_is_seeded() {
        let tokenizer = letters_tokenizer();
        let vocab_size = tokenizer.vocab().len();

        let run = |seed| {
            let evaluator = FnEvaluator::new(|token: u32, _: Option<&HiddenState>| -> WLResult<Evaluation> {
                let logits = (0..vocab_size).map(|i| ((i as u32 ^ token) % 7) as f32).collect();
                Ok(Evaluation::new(vec![token as f32], logits))
            });
            let mut conv = Conversation::with_seed(tokenizer.clone(), evaluator, seed);
            conv.process_input("hello").unwrap();
            let options = GenerationOptions::default()
                .with_max_tokens(8)
                .with_sampler(SamplerOptions::default().with_temperature(0.8).with_top_p(0.9));
            conv.generate_response(&options, |_| true).unwrap()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_find_stop() {
        assert_eq!(find_stop("abc\ndef", 4, "\n"), Some(3));
        assert_eq!(find_stop("abcdef", 3, "cd"), Some(2));
        assert_eq!(find_stop("ĠĠx", 1, "Ġx"), Some(2));
        assert_eq!(find_stop("abc", 1, "z"), None);
    }

    #[test]
    fn test_send_sync() {
        let conv = scripted(&[" hi"]);
        static_is_send_sync_check(&conv);
    }
}
