//! Entrega de tokens entre hilos.
//!
//! El lexer se ejecuta como productor independiente, concurrente al
//! parser. Ambos se conectan por medio de un canal de rendezvous sin
//! buffer: cada entrega de un token bloquea al productor hasta que el
//! parser toma el anterior, por lo cual la entrega es estrictamente en
//! orden y el productor nunca adelanta más de un token.
//!
//! El flujo termina ya sea con un centinela explícito ([`TokenKind::Eof`]
//! o [`TokenKind::Error`]) o con el cierre del canal. En este último caso
//! el consumidor sintetiza un token de error en vez de bloquearse.

use std::{
    io::BufRead,
    sync::mpsc::{self, Receiver},
    thread::{self, JoinHandle},
};

use tracing::{trace, warn};

use crate::{
    lex::{Lexer, Token, TokenKind},
    source::{self, Position},
};

/// Lexema del token sintetizado ante un cierre prematuro del canal.
const CLOSED_LEXEME: &str = "token stream closed unexpectedly";

/// Extremo consumidor del flujo de tokens.
pub struct TokenStream {
    receiver: Option<Receiver<Token>>,
    producer: Option<JoinHandle<()>>,
    last: Position,
    finished: bool,
}

/// Inicia al lexer en un hilo productor.
pub fn spawn<R>(reader: R) -> TokenStream
where
    R: BufRead + Send + 'static,
{
    let (sender, receiver) = mpsc::sync_channel(0);

    let producer = thread::spawn(move || {
        let tokens = Lexer::new(source::consume(reader)).tokens();
        for token in tokens {
            trace!(kind = ?token.kind(), lexeme = token.lexeme(), line = token.line(), "token");

            // El receptor se descarta si el parser falla antes del final
            if sender.send(token).is_err() {
                break;
            }
        }
    });

    TokenStream::from_parts(receiver, Some(producer))
}

impl TokenStream {
    /// Construye un flujo a partir de un receptor arbitrario.
    ///
    /// Esto permite alimentar al parser desde cualquier productor
    /// que respete la convención de centinelas.
    pub fn from_receiver(receiver: Receiver<Token>) -> Self {
        TokenStream::from_parts(receiver, None)
    }

    fn from_parts(receiver: Receiver<Token>, producer: Option<JoinHandle<()>>) -> Self {
        TokenStream {
            receiver: Some(receiver),
            producer,
            last: Position::default(),
            finished: false,
        }
    }
}

impl Iterator for TokenStream {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }

        let received = self.receiver.as_ref().and_then(|receiver| receiver.recv().ok());
        let token = match received {
            Some(token) => token,
            None => {
                warn!(line = self.last.line(), "token stream closed without a sentinel");
                Token::new(TokenKind::Error, CLOSED_LEXEME, self.last)
            }
        };

        self.last = token.position();
        self.finished = token.is_sentinel();

        Some(token)
    }
}

impl Drop for TokenStream {
    fn drop(&mut self) {
        // Descartar el receptor desbloquea al productor, que entonces termina
        self.receiver.take();

        if let Some(producer) = self.producer.take() {
            if producer.join().is_err() {
                warn!("lexer thread panicked");
            }
        }
    }
}
