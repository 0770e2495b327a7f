use actix_web::{dev::Payload, web::Data, Error as ActixError, FromRequest, HttpRequest};
use anyhow::{anyhow, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::config::Config;
use crate::database::models::{AuthResponse, CreateUserInput, LoginInput, User, UserRole};
use crate::database::repositories::UserRepository;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub username: String,
    pub role: UserRole,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        self.sub
    }
    pub fn is_master(&self) -> bool {
        self.role == UserRole::Master
    }
    pub fn is_terminal(&self) -> bool {
        self.role == UserRole::Terminal
    }
}

impl FromRequest for Claims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = req.headers().get("Authorization");

        if let Some(auth_header) = auth_header {
            if let Ok(auth_str) = auth_header.to_str() {
                if let Some(token) = auth_str.strip_prefix("Bearer ") {
                    if let Some(config) = req.app_data::<Data<Config>>() {
                        match decode::<Claims>(
                            token,
                            &DecodingKey::from_secret(config.jwt_secret.as_ref()),
                            &Validation::new(Algorithm::HS256),
                        ) {
                            Ok(token_data) => {
                                return ready(Ok(token_data.claims));
                            }
                            Err(_) => {
                                return ready(Err(AppError::Unauthorized.into()));
                            }
                        }
                    }
                }
            }
        }

        ready(Err(AppError::Unauthorized.into()))
    }
}

#[derive(Clone)]
pub struct AuthService {
    user_repository: UserRepository,
    config: Config,
}

impl AuthService {
    pub fn new(user_repository: UserRepository, config: Config) -> Self {
        Self {
            user_repository,
            config,
        }
    }

    /// Create an employee. The login is derived from the real name; a
    /// numeric suffix resolves collisions.
    pub async fn register(&self, input: CreateUserInput) -> Result<User> {
        let base = generate_username(&input.real_name);
        let mut username = base.clone();
        let mut attempt = 1;
        while self.user_repository.username_exists(&username).await? {
            attempt += 1;
            username = format!("{}{}", base, attempt);
        }

        let password_hash = hash(&input.password, DEFAULT_COST)?;
        let now = Utc::now();

        let user = User {
            id: Uuid::new_v4(),
            username,
            real_name: input.real_name,
            password_hash,
            role: input.role.unwrap_or_default(),
            entry_time: input.entry_time,
            lunch_out_time: input.lunch_out_time,
            lunch_in_time: input.lunch_in_time,
            exit_time: input.exit_time,
            schedule: input.schedule.unwrap_or_default(),
            schedule_anchor_date: input.schedule_anchor_date,
            created_at: now,
            updated_at: now,
        };

        self.user_repository.create_user(&user).await?;

        Ok(user)
    }

    pub async fn login(&self, input: LoginInput) -> Result<AuthResponse> {
        let user = self
            .user_repository
            .find_by_username(&input.username)
            .await?
            .ok_or_else(|| anyhow!("Invalid username or password"))?;

        if !verify(&input.password, &user.password_hash)? {
            return Err(anyhow!("Invalid username or password"));
        }

        let token = self.generate_token(&user)?;

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    pub fn generate_token(&self, user: &User) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(Duration::days(self.config.jwt_expiration_days))
            .ok_or_else(|| anyhow!("Invalid expiration timestamp"))?
            .timestamp() as usize;

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            exp: expiration,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?;

        Ok(token)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_ref()),
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }
}

/// Login derived from the first name: lowercased, accents stripped, letters
/// only. "José Ângelo da Silva" becomes "jose".
pub fn generate_username(real_name: &str) -> String {
    let first = real_name.split_whitespace().next().unwrap_or("user");
    let folded: String = first
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect();

    let re = Regex::new(r"[^a-z]").unwrap();
    let cleaned = re.replace_all(&folded, "").to_string();
    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn username_comes_from_the_deaccented_first_name() {
        assert_eq!(generate_username("José Ângelo da Silva"), "jose");
        assert_eq!(generate_username("Thaynara Master"), "thaynara");
        assert_eq!(generate_username("Conceição Souza"), "conceicao");
    }

    #[test]
    fn username_falls_back_when_nothing_survives() {
        assert_eq!(generate_username(""), "user");
        assert_eq!(generate_username("123 456"), "user");
    }

    #[test]
    fn claims_role_helpers() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "thaynara".to_string(),
            role: UserRole::Master,
            exp: 0,
        };
        assert!(claims.is_master());
        assert!(!claims.is_terminal());
    }
}
